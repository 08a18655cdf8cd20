use crate::ast::{BlockStmt, Expr};
use crate::builtins::BuiltinError;
use crate::environment::EnvRef;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub type ArrayRef = Rc<RefCell<Vec<Object>>>;
pub type HashTableRef = Rc<RefCell<HashTable>>;

/// Runtime value. Arrays and hash tables are shared handles: every binding
/// holding the same handle observes mutation made through any other.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    String(String),
    Boolean(bool),
    /// No value was produced.
    Null,
    /// An argument or slot that was intentionally left out.
    Empty,
    Array(ArrayRef),
    HashTable(HashTableRef),
    Function(Rc<Function>),
    Builtin(BuiltinFunction),
    Constant(BuiltinConstant),
    Error { message: String },
}

/// Upper bound on the slots of a declared or resized array.
pub const MAX_ARRAY_SLOTS: usize = 1 << 24;

/// Slot count of an array whose highest index is `size`; `None` when `size`
/// is below -1 or the array would exceed [`MAX_ARRAY_SLOTS`].
pub fn array_slots(size: i64) -> Option<usize> {
    let slots = usize::try_from(size.checked_add(1)?).ok()?;
    (slots <= MAX_ARRAY_SLOTS).then_some(slots)
}

impl Object {
    pub fn new_array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn new_hash_table(table: HashTable) -> Self {
        Object::HashTable(Rc::new(RefCell::new(table)))
    }

    /// Only `FALSE` and the integer `0` are false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Integer(0))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::String(_) => "STRING",
            Object::Boolean(_) => "BOOLEAN",
            Object::Null => "NULL",
            Object::Empty => "EMPTY",
            Object::Array(_) => "ARRAY",
            Object::HashTable(_) => "HASHTBL",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN_FUNCTION",
            Object::Constant(_) => "BUILTIN_CONSTANT",
            Object::Error { .. } => "ERROR",
        }
    }

    /// Hash key for `Integer`, `Boolean` and `String`; `None` for everything else.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(n) => Some(HashKey {
                kind: HashKind::Integer,
                value: *n as u64,
            }),
            Object::Boolean(b) => Some(HashKey {
                kind: HashKind::Boolean,
                value: u64::from(*b),
            }),
            Object::String(s) => Some(HashKey {
                kind: HashKind::String,
                value: fnv1a(s.as_bytes()),
            }),
            _ => None,
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(l), Object::Integer(r)) => l == r,
            (Object::String(l), Object::String(r)) => l == r,
            (Object::Boolean(l), Object::Boolean(r)) => l == r,
            (Object::Null, Object::Null) => true,
            (Object::Empty, Object::Empty) => true,
            (Object::Array(l), Object::Array(r)) => Rc::ptr_eq(l, r) || *l.borrow() == *r.borrow(),
            (Object::HashTable(l), Object::HashTable(r)) => Rc::ptr_eq(l, r),
            (Object::Function(l), Object::Function(r)) => Rc::ptr_eq(l, r),
            (Object::Builtin(l), Object::Builtin(r)) => l.name == r.name,
            (Object::Constant(l), Object::Constant(r)) => l.tag == r.tag,
            (Object::Error { message: l }, Object::Error { message: r }) => l == r,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{}", n),
            Object::String(s) => write!(f, "{}", s),
            Object::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Object::Null => write!(f, "NULL"),
            Object::Empty => Ok(()),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, item) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Object::HashTable(table) => {
                let table = table.borrow();
                write!(f, "{{")?;
                for (i, pair) in table.pairs_in_order().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => write!(f, "{}", function),
            Object::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Object::Constant(constant) => write!(f, "{}", constant.tag.name()),
            Object::Error { message } => write!(f, "ERROR: {}", message),
        }
    }
}

/// 64-bit FNV-1a; content-derived so equal strings always share a key.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKind {
    Integer,
    Boolean,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashKey {
    pub kind: HashKind,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

#[derive(Debug, Clone, Default)]
pub struct HashTable {
    pairs: HashMap<HashKey, HashPair>,
    insertion_order: Vec<HashKey>,
    pub is_sorted: bool,
    pub is_case_sensitive: bool,
}

impl HashTable {
    pub fn new(is_sorted: bool, is_case_sensitive: bool) -> Self {
        Self {
            pairs: HashMap::new(),
            insertion_order: Vec::new(),
            is_sorted,
            is_case_sensitive,
        }
    }

    /// Case-insensitive tables fold string keys to upper case before hashing.
    pub fn key_for(&self, key: &Object) -> Option<HashKey> {
        match key {
            Object::String(s) if !self.is_case_sensitive => {
                Object::String(s.to_uppercase()).hash_key()
            }
            other => other.hash_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `None` when `key` is not hashable.
    pub fn get(&self, key: &Object) -> Option<Option<&Object>> {
        let hash_key = self.key_for(key)?;
        Some(self.pairs.get(&hash_key).map(|pair| &pair.value))
    }

    pub fn contains(&self, key: &Object) -> Option<bool> {
        let hash_key = self.key_for(key)?;
        Some(self.pairs.contains_key(&hash_key))
    }

    /// Overwriting an existing key keeps its original position.
    pub fn insert(&mut self, key: Object, value: Object) -> Option<()> {
        let hash_key = self.key_for(&key)?;
        match self.pairs.get_mut(&hash_key) {
            Some(pair) => pair.value = value,
            None => {
                self.insertion_order.push(hash_key);
                self.pairs.insert(hash_key, HashPair { key, value });
            }
        }
        Some(())
    }

    pub fn remove(&mut self, key: &Object) -> Option<bool> {
        let hash_key = self.key_for(key)?;
        if self.pairs.remove(&hash_key).is_some() {
            self.insertion_order.retain(|k| *k != hash_key);
            Some(true)
        } else {
            Some(false)
        }
    }

    /// The N-th pair: insertion order when sorted, hash-key order otherwise.
    pub fn pair_by_index(&self, index: usize) -> Option<&HashPair> {
        self.pairs_in_order().nth(index)
    }

    pub fn pairs_in_order(&self) -> impl Iterator<Item = &HashPair> + '_ {
        let keys: Vec<HashKey> = if self.is_sorted {
            self.insertion_order.clone()
        } else {
            let mut keys = self.insertion_order.clone();
            keys.sort();
            keys
        };
        keys.into_iter().filter_map(move |key| self.pairs.get(&key))
    }
}

/// A closure over the environment active where it was declared.
pub struct Function {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Rc<BlockStmt>,
    pub env: EnvRef,
    pub is_procedure: bool,
}

// Manual impl: the captured environment usually contains this function.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("is_procedure", &self.is_procedure)
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let keyword = if self.is_procedure { "PROCEDURE" } else { "FUNCTION" };
        write!(f, "{} {}({})", keyword, self.name, self.parameters.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    CalcAdd,
    CalcMin,
    CalcMax,
    CalcAvr,
    HashCaseCare,
    HashSort,
    HashKey,
    HashVal,
    HashExists,
    HashRemove,
    HashRemoveAll,
}

impl ConstantTag {
    pub fn name(&self) -> &'static str {
        match self {
            ConstantTag::CalcAdd => "CALC_ADD",
            ConstantTag::CalcMin => "CALC_MIN",
            ConstantTag::CalcMax => "CALC_MAX",
            ConstantTag::CalcAvr => "CALC_AVR",
            ConstantTag::HashCaseCare => "HASH_CASECARE",
            ConstantTag::HashSort => "HASH_SORT",
            ConstantTag::HashKey => "HASH_KEY",
            ConstantTag::HashVal => "HASH_VAL",
            ConstantTag::HashExists => "HASH_EXISTS",
            ConstantTag::HashRemove => "HASH_REMOVE",
            ConstantTag::HashRemoveAll => "HASH_REMOVEALL",
        }
    }
}

/// Named runtime constant: matched by `tag`, usable as an operand through `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinConstant {
    pub tag: ConstantTag,
    pub value: i64,
}

/// One call-site argument: the expression as written and what it evaluated to.
#[derive(Debug, Clone)]
pub struct BuiltinArgument<'a> {
    pub expression: &'a Expr,
    pub value: Object,
}

/// What a builtin hands back to the evaluator.
#[derive(Debug, Clone)]
pub enum BuiltinOutcome<'a> {
    /// Substitute `Object` for the call expression.
    Value(Object),
    /// Assign `value` to `target` in the caller's scope, then substitute `result`
    /// for the call expression.
    Reference {
        target: &'a Expr,
        value: Object,
        result: Object,
    },
}

pub type BuiltinFn =
    for<'a> fn(&[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError>;

#[derive(Clone, Copy)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BuiltinFunction({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_slots() {
        assert_eq!(array_slots(-1), Some(0));
        assert_eq!(array_slots(2), Some(3));
        assert_eq!(array_slots(-2), None);
        assert_eq!(array_slots(i64::MAX), None);
        assert_eq!(array_slots(1 << 60), None);
        assert_eq!(array_slots(MAX_ARRAY_SLOTS as i64 - 1), Some(MAX_ARRAY_SLOTS));
        assert_eq!(array_slots(MAX_ARRAY_SLOTS as i64), None);
    }

    #[test]
    fn test_string_hash_key() {
        let hello1 = Object::String("Hello World".to_string());
        let hello2 = Object::String("Hello World".to_string());
        let diff = Object::String("My name is johnny".to_string());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_ne!(hello1.hash_key(), diff.hash_key());
        assert!(Object::new_array(vec![]).hash_key().is_none());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Object::Integer(0).is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(Object::Integer(-1).is_truthy());
        assert!(Object::String(String::new()).is_truthy());
        assert!(Object::Null.is_truthy());
        assert!(Object::new_array(vec![]).is_truthy());
    }

    #[test]
    fn test_pair_by_index_follows_insertion_order_when_sorted() {
        let mut table = HashTable::new(true, false);
        for (key, value) in [("c", 3), ("a", 1), ("b", 2)] {
            table.insert(Object::String(key.to_string()), Object::Integer(value));
        }

        let pair = table.pair_by_index(1).unwrap();
        assert_eq!(pair.key, Object::String("a".to_string()));
        assert_eq!(pair.value, Object::Integer(1));
        assert!(table.pair_by_index(3).is_none());
    }

    #[test]
    fn test_unsorted_order_is_stable() {
        let mut table = HashTable::new(false, true);
        for key in ["x", "y", "z"] {
            table.insert(Object::String(key.to_string()), Object::Null);
        }
        let first: Vec<Object> = table.pairs_in_order().map(|p| p.key.clone()).collect();
        let second: Vec<Object> = table.pairs_in_order().map(|p| p.key.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_case_folding() {
        let mut folded = HashTable::new(false, false);
        folded.insert(Object::String("Key".to_string()), Object::Integer(1));
        assert_eq!(folded.contains(&Object::String("KEY".to_string())), Some(true));
        // the original spelling is kept for HASH_KEY
        assert_eq!(folded.pair_by_index(0).unwrap().key, Object::String("Key".to_string()));

        let mut exact = HashTable::new(false, true);
        exact.insert(Object::String("Key".to_string()), Object::Integer(1));
        assert_eq!(exact.contains(&Object::String("KEY".to_string())), Some(false));
    }

    #[test]
    fn test_remove_and_reinsert() {
        let mut table = HashTable::new(true, true);
        table.insert(Object::Integer(1), Object::String("one".to_string()));
        table.insert(Object::Integer(2), Object::String("two".to_string()));
        assert_eq!(table.remove(&Object::Integer(1)), Some(true));
        assert_eq!(table.remove(&Object::Integer(1)), Some(false));
        assert_eq!(table.len(), 1);
        assert_eq!(table.pair_by_index(0).unwrap().key, Object::Integer(2));
        assert_eq!(table.insert(Object::new_array(vec![]), Object::Null), None);
    }
}
