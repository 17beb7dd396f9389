use crate::error::ModelError;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENUM_ID: AtomicU64 = AtomicU64::new(1);

/// One element of an enum. It records which enum instance it was built by,
/// so two enums sharing a qualified name never accept each other's elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumElem {
    owner:      u64,
    enum_qname: String,
    name:       String,
    value:      i32,
}

impl EnumElem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Qualified name of the enclosing enum.
    pub fn enum_qname(&self) -> &str {
        &self.enum_qname
    }

    pub fn qname(&self) -> String {
        format!("{}.{}", self.enum_qname, self.name)
    }
}

impl fmt::Display for EnumElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.enum_qname, self.name)
    }
}

/// A finished enum: an ordered list of elements that can no longer grow.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    id:    u64,
    elems: Vec<EnumElem>,
    index: HashMap<String, usize>,
    docs:  Option<Vec<String>>,
}

impl EnumType {
    pub fn elements(&self) -> &[EnumElem] {
        &self.elems
    }

    pub fn element(&self, name: &str) -> Option<&EnumElem> {
        self.index.get(name).map(|&i| &self.elems[i])
    }

    pub fn doc_comments(&self) -> Option<&[String]> {
        self.docs.as_deref()
    }

    /// True when `elem` was built by this enum rather than by another enum
    /// of the same name.
    pub fn owns(&self, elem: &EnumElem) -> bool {
        elem.owner == self.id
    }
}

/// Collects enum elements while the enum body is being parsed.
///
/// Ids are auto-assigned from a running counter that always sits one past
/// the highest id seen so far, so `A, B = 5, C` yields 0, 5, 6. Calling
/// [`EnumBuilder::build`] consumes the builder; a finished [`EnumType`] has
/// no way to add elements.
#[derive(Debug)]
pub struct EnumBuilder {
    id:      u64,
    qname:   String,
    elems:   Vec<EnumElem>,
    index:   HashMap<String, usize>,
    ids:     HashSet<i32>,
    next_id: i64,
    docs:    Option<Vec<String>>,
}

impl EnumBuilder {
    pub fn new(qname: impl Into<String>, docs: Option<Vec<String>>) -> Self {
        EnumBuilder {
            id: NEXT_ENUM_ID.fetch_add(1, Ordering::Relaxed),
            qname: qname.into(),
            elems: Vec::new(),
            index: HashMap::new(),
            ids: HashSet::new(),
            next_id: 0,
            docs,
        }
    }

    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn add_elem(&mut self, name: &str) -> Result<&EnumElem, ModelError> {
        let id = i32::try_from(self.next_id)
            .map_err(|_| ModelError::EnumIdOverflow(self.qname.clone()))?;
        self.add_elem_with_id(name, id)
    }

    pub fn add_elem_with_id(&mut self, name: &str, id: i32) -> Result<&EnumElem, ModelError> {
        if self.index.contains_key(name) {
            return Err(ModelError::DuplicateEnumName {
                name:  name.to_string(),
                owner: self.qname.clone(),
            });
        }
        if self.ids.contains(&id) {
            return Err(ModelError::DuplicateEnumId {
                id,
                owner: self.qname.clone(),
            });
        }
        if id as i64 >= self.next_id {
            self.next_id = id as i64 + 1;
        }
        self.ids.insert(id);
        self.index.insert(name.to_string(), self.elems.len());
        self.elems.push(EnumElem {
            owner:      self.id,
            enum_qname: self.qname.clone(),
            name:       name.to_string(),
            value:      id,
        });
        Ok(&self.elems[self.elems.len() - 1])
    }

    pub fn build(self) -> EnumType {
        EnumType {
            id:    self.id,
            elems: self.elems,
            index: self.index,
            docs:  self.docs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_ids_resume_above_explicit() {
        let mut b = EnumBuilder::new("m.Shape", None);
        b.add_elem("A").unwrap();
        b.add_elem_with_id("B", 5).unwrap();
        b.add_elem("C").unwrap();
        let e = b.build();
        let ids: Vec<i32> = e.elements().iter().map(|x| x.value()).collect();
        assert_eq!(ids, vec![0, 5, 6]);
        assert_eq!(e.element("C").unwrap().qname(), "m.Shape.C");
    }

    #[test]
    fn test_lower_explicit_id_keeps_counter() {
        let mut b = EnumBuilder::new("Flags", None);
        b.add_elem_with_id("HIGH", 10).unwrap();
        b.add_elem_with_id("LOW", 2).unwrap();
        b.add_elem("NEXT").unwrap();
        let e = b.build();
        assert_eq!(e.element("NEXT").unwrap().value(), 11);
    }

    #[test]
    fn test_duplicate_name_and_id_rejected() {
        let mut b = EnumBuilder::new("E", None);
        b.add_elem("A").unwrap();
        assert!(matches!(b.add_elem("A"), Err(ModelError::DuplicateEnumName { .. })));
        assert!(matches!(b.add_elem_with_id("B", 0), Err(ModelError::DuplicateEnumId { id: 0, .. })));
    }

    #[test]
    fn test_auto_id_after_out_of_order_explicit_ids() {
        let mut b = EnumBuilder::new("E", None);
        b.add_elem_with_id("ONE", 1).unwrap();
        b.add_elem_with_id("ZERO", 0).unwrap();
        assert_eq!(b.add_elem("TWO").unwrap().value(), 2);
    }

    #[test]
    fn test_same_name_enums_are_distinct() {
        let mut first = EnumBuilder::new("m.Color", None);
        first.add_elem("RED").unwrap();
        let first = first.build();
        let mut second = EnumBuilder::new("m.Color", None);
        second.add_elem("RED").unwrap();
        let second = second.build();

        let red = first.element("RED").unwrap();
        assert!(first.owns(red));
        assert!(!second.owns(red));
        assert_ne!(red, second.element("RED").unwrap());
    }
}
