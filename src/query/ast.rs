use serde::{Serialize, Deserialize};

/// Logical query tree handed to the plan builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    Term(TermQuery),            // Word in a text field
    Attribute(AttributeQuery),  // Exact value of an attribute field
    Bool(BoolQuery),            // must/should/must_not/filter clauses
    And(Vec<Query>),
    Or(Vec<Query>),
    AndNot { positive: Box<Query>, negatives: Vec<Query> },
    Rank(Vec<Query>),           // First clause matches, the rest only rank
    Near(ProximityQuery),
    ONear(ProximityQuery),      // Near with terms in order
    WeakAnd { target_hits: u32, children: Vec<Query> },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermQuery {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeQuery {
    pub field: String,
    pub value: String,
}

/// Terms that must occur within `window` positions of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProximityQuery {
    pub terms: Vec<TermQuery>,
    pub window: u32,
}

/// Boolean query with must/should/must_not clauses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Query>,      // All must match (AND)
    pub should: Vec<Query>,    // At least one must match (OR)
    pub must_not: Vec<Query>,  // None must match (NOT)
    pub filter: Vec<Query>,    // Must match, leaves marked as filters
}

impl Query {
    pub fn term(field: &str, value: &str) -> Self {
        Query::Term(TermQuery {
            field: field.to_string(),
            value: value.to_lowercase(),
        })
    }

    pub fn attribute(field: &str, value: &str) -> Self {
        Query::Attribute(AttributeQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn and_not(positive: Query, negatives: Vec<Query>) -> Self {
        Query::AndNot {
            positive: Box::new(positive),
            negatives,
        }
    }

    pub fn near(field: &str, words: &[&str], window: u32) -> Self {
        Query::Near(ProximityQuery::new(field, words, window))
    }

    pub fn onear(field: &str, words: &[&str], window: u32) -> Self {
        Query::ONear(ProximityQuery::new(field, words, window))
    }
}

impl ProximityQuery {
    pub fn new(field: &str, words: &[&str], window: u32) -> Self {
        ProximityQuery {
            terms: words
                .iter()
                .map(|w| TermQuery {
                    field: field.to_string(),
                    value: w.to_lowercase(),
                })
                .collect(),
            window,
        }
    }
}

impl BoolQuery {
    pub fn new() -> Self {
        BoolQuery {
            must: Vec::new(),
            should: Vec::new(),
            must_not: Vec::new(),
            filter: Vec::new(),
        }
    }

    pub fn with_must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn with_should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn with_must_not(mut self, query: Query) -> Self {
        self.must_not.push(query);
        self
    }

    pub fn with_filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }
}

impl Default for BoolQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_json_shape() {
        let query = Query::Bool(BoolQuery::new().with_must(Query::term("title", "Rust")));
        let json = serde_json::to_value(&query).expect("serializes");
        assert_eq!(json["Bool"]["must"][0]["Term"]["value"], "rust");
        let back: Query = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, query);
    }
}
