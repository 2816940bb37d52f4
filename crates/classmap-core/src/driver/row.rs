use crate::{stmt::Value, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Row {
        Row { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Value> {
        self.values
            .get(index)
            .ok_or_else(|| crate::err!("row has no column at index {index}"))
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.get(index)?.to_i64()
    }

    pub fn get_opt_i64(&self, index: usize) -> Result<Option<i64>> {
        self.get(index)?.to_opt_i64()
    }

    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.get(index)?.to_bool()
    }

    pub fn get_string(&self, index: usize) -> Result<String> {
        self.get(index)?.as_str().map(str::to_string)
    }

    pub fn get_opt_string(&self, index: usize) -> Result<Option<String>> {
        self.get(index)?.to_opt_string()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
