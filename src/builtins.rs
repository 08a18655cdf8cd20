use crate::object::{
    array_slots, ArrayRef, BuiltinArgument, BuiltinConstant, BuiltinFn, BuiltinFunction,
    BuiltinOutcome, ConstantTag, Object, MAX_ARRAY_SLOTS,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuiltinError {
    #[error("wrong number of arguments to `{name}`. got={got}, want={want}")]
    Arity {
        name: &'static str,
        got: usize,
        want: &'static str,
    },
    #[error("argument {position} to `{name}` not supported, got {got}")]
    ArgumentType {
        name: &'static str,
        position: usize,
        got: &'static str,
    },
    #[error("argument {position} to `{name}` out of range: {detail}")]
    ValueRange {
        name: &'static str,
        position: usize,
        detail: String,
    },
    #[error("array passed to `{name}` has a non-integer element at index {index}: {got}")]
    NonIntegerElement {
        name: &'static str,
        index: usize,
        got: &'static str,
    },
}

enum Entry {
    Function(BuiltinFn),
    Constant(ConstantTag, i64),
}

const REGISTRY: &[(&str, Entry)] = &[
    ("LENGTH", Entry::Function(length)),
    ("RESIZE", Entry::Function(resize)),
    ("CALCARRAY", Entry::Function(calc_array)),
    ("SETCLEAR", Entry::Function(set_clear)),
    ("SLICE", Entry::Function(slice)),
    ("JOIN", Entry::Function(join)),
    ("CALC_ADD", Entry::Constant(ConstantTag::CalcAdd, 1)),
    ("CALC_MIN", Entry::Constant(ConstantTag::CalcMin, 2)),
    ("CALC_MAX", Entry::Constant(ConstantTag::CalcMax, 3)),
    ("CALC_AVR", Entry::Constant(ConstantTag::CalcAvr, 4)),
    ("HASH_CASECARE", Entry::Constant(ConstantTag::HashCaseCare, 0x1000)),
    ("HASH_SORT", Entry::Constant(ConstantTag::HashSort, 0x2000)),
    ("HASH_KEY", Entry::Constant(ConstantTag::HashKey, -101)),
    ("HASH_VAL", Entry::Constant(ConstantTag::HashVal, -102)),
    ("HASH_EXISTS", Entry::Constant(ConstantTag::HashExists, -103)),
    ("HASH_REMOVE", Entry::Constant(ConstantTag::HashRemove, -104)),
    ("HASH_REMOVEALL", Entry::Constant(ConstantTag::HashRemoveAll, -109)),
];

/// Case-insensitive lookup of a builtin function or named constant.
pub fn lookup(name: &str) -> Option<Object> {
    let key = name.to_uppercase();
    REGISTRY
        .iter()
        .find(|(entry_name, _)| *entry_name == key)
        .map(|(entry_name, entry)| match entry {
            Entry::Function(func) => Object::Builtin(BuiltinFunction {
                name: *entry_name,
                func: *func,
            }),
            Entry::Constant(tag, value) => Object::Constant(BuiltinConstant {
                tag: *tag,
                value: *value,
            }),
        })
}

fn check_arity(
    name: &'static str,
    args: &[BuiltinArgument],
    min: usize,
    max: usize,
    want: &'static str,
) -> Result<(), BuiltinError> {
    if args.len() < min || args.len() > max {
        return Err(BuiltinError::Arity {
            name,
            got: args.len(),
            want,
        });
    }
    Ok(())
}

fn array_arg(
    name: &'static str,
    args: &[BuiltinArgument],
    position: usize,
) -> Result<ArrayRef, BuiltinError> {
    match &args[position - 1].value {
        Object::Array(elements) => Ok(elements.clone()),
        other => Err(BuiltinError::ArgumentType {
            name,
            position,
            got: other.type_name(),
        }),
    }
}

/// A missing or omitted argument yields `None`.
fn optional_integer(
    name: &'static str,
    args: &[BuiltinArgument],
    position: usize,
) -> Result<Option<i64>, BuiltinError> {
    match args.get(position - 1).map(|arg| &arg.value) {
        None | Some(Object::Empty) => Ok(None),
        Some(Object::Integer(n)) => Ok(Some(*n)),
        Some(Object::Constant(constant)) => Ok(Some(constant.value)),
        Some(other) => Err(BuiltinError::ArgumentType {
            name,
            position,
            got: other.type_name(),
        }),
    }
}

/// Inclusive `from..=to` over a sequence of `len` items. `to` is clamped to the
/// last index; an empty range comes back as `None`.
fn inclusive_range(
    name: &'static str,
    args: &[BuiltinArgument],
    from_position: usize,
    len: usize,
) -> Result<Option<(usize, usize)>, BuiltinError> {
    let from = optional_integer(name, args, from_position)?.unwrap_or(0);
    let last = len as i64 - 1;
    let to = optional_integer(name, args, from_position + 1)?
        .unwrap_or(last)
        .min(last);

    if from < 0 {
        return Err(BuiltinError::ValueRange {
            name,
            position: from_position,
            detail: format!("start index {} is negative", from),
        });
    }
    if to < from {
        return Ok(None);
    }
    Ok(Some((from as usize, to as usize)))
}

fn length<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    check_arity("LENGTH", args, 1, 1, "1")?;
    let len = match &args[0].value {
        Object::String(s) => s.chars().count(),
        Object::Array(elements) => elements.borrow().len(),
        Object::HashTable(table) => table.borrow().len(),
        other => {
            return Err(BuiltinError::ArgumentType {
                name: "LENGTH",
                position: 1,
                got: other.type_name(),
            })
        }
    };
    Ok(BuiltinOutcome::Value(Object::Integer(len as i64)))
}

/// `RESIZE(arr)` reports the highest index; `RESIZE(arr, n)` replaces the
/// caller's array with one of `n + 1` slots and evaluates to `n`.
fn resize<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    check_arity("RESIZE", args, 1, 2, "1 or 2")?;
    let array = array_arg("RESIZE", args, 1)?;

    let size = match args.get(1).map(|arg| &arg.value) {
        None => {
            let highest = array.borrow().len() as i64 - 1;
            return Ok(BuiltinOutcome::Value(Object::Integer(highest)));
        }
        Some(Object::Integer(n)) => *n,
        Some(other) => {
            return Err(BuiltinError::ArgumentType {
                name: "RESIZE",
                position: 2,
                got: other.type_name(),
            })
        }
    };
    let Some(slots) = array_slots(size) else {
        return Err(BuiltinError::ValueRange {
            name: "RESIZE",
            position: 2,
            detail: format!("size {} is not between -1 and {}", size, MAX_ARRAY_SLOTS - 1),
        });
    };

    let mut resized: Vec<Object> = array.borrow().iter().take(slots).cloned().collect();
    resized.resize(slots, Object::Empty);

    Ok(BuiltinOutcome::Reference {
        target: args[0].expression,
        value: Object::new_array(resized),
        result: Object::Integer(size),
    })
}

fn calc_mode(value: &Object) -> Option<ConstantTag> {
    match value {
        Object::Constant(constant) => match constant.tag {
            tag @ (ConstantTag::CalcAdd
            | ConstantTag::CalcMin
            | ConstantTag::CalcMax
            | ConstantTag::CalcAvr) => Some(tag),
            _ => None,
        },
        _ => None,
    }
}

/// `CALCARRAY(arr, mode [, from [, to]])`
fn calc_array<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    const NAME: &str = "CALCARRAY";
    check_arity(NAME, args, 2, 4, "2 to 4")?;
    let array = array_arg(NAME, args, 1)?;
    let mode = calc_mode(&args[1].value).ok_or(BuiltinError::ArgumentType {
        name: NAME,
        position: 2,
        got: args[1].value.type_name(),
    })?;

    let elements = array.borrow();
    let Some((from, to)) = inclusive_range(NAME, args, 3, elements.len())? else {
        let empty = match mode {
            ConstantTag::CalcAdd => Object::Integer(0),
            _ => Object::Null,
        };
        return Ok(BuiltinOutcome::Value(empty));
    };

    let mut values = Vec::with_capacity(to - from + 1);
    for (index, element) in elements.iter().enumerate().take(to + 1).skip(from) {
        match element {
            Object::Integer(n) => values.push(*n),
            other => {
                return Err(BuiltinError::NonIntegerElement {
                    name: NAME,
                    index,
                    got: other.type_name(),
                })
            }
        }
    }

    let sum = values
        .iter()
        .try_fold(0i64, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| BuiltinError::ValueRange {
            name: NAME,
            position: 1,
            detail: "sum overflows a 64-bit integer".to_string(),
        });

    let result = match mode {
        ConstantTag::CalcAdd => Object::Integer(sum?),
        ConstantTag::CalcMin => values.iter().min().map_or(Object::Null, |n| Object::Integer(*n)),
        ConstantTag::CalcMax => values.iter().max().map_or(Object::Null, |n| Object::Integer(*n)),
        _ => Object::Integer(sum? / values.len() as i64),
    };
    Ok(BuiltinOutcome::Value(result))
}

/// Fills the shared array in place.
fn set_clear<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    check_arity("SETCLEAR", args, 2, 2, "2")?;
    let array = array_arg("SETCLEAR", args, 1)?;
    let fill = args[1].value.clone();
    for slot in array.borrow_mut().iter_mut() {
        *slot = fill.clone();
    }
    Ok(BuiltinOutcome::Value(Object::Empty))
}

fn slice<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    check_arity("SLICE", args, 1, 3, "1 to 3")?;
    let array = array_arg("SLICE", args, 1)?;
    let elements = array.borrow();
    let copied = match inclusive_range("SLICE", args, 2, elements.len())? {
        Some((from, to)) => elements[from..=to].to_vec(),
        None => Vec::new(),
    };
    Ok(BuiltinOutcome::Value(Object::new_array(copied)))
}

fn join<'a>(args: &[BuiltinArgument<'a>]) -> Result<BuiltinOutcome<'a>, BuiltinError> {
    check_arity("JOIN", args, 1, 2, "1 or 2")?;
    let array = array_arg("JOIN", args, 1)?;
    let separator = match args.get(1).map(|arg| &arg.value) {
        None | Some(Object::Empty) => " ".to_string(),
        Some(Object::String(s)) => s.clone(),
        Some(other) => {
            return Err(BuiltinError::ArgumentType {
                name: "JOIN",
                position: 2,
                got: other.type_name(),
            })
        }
    };
    let joined = array
        .borrow()
        .iter()
        .map(|element| element.to_string())
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(BuiltinOutcome::Value(Object::String(joined)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::error::Span;

    fn call(name: &str, values: Vec<Object>) -> Result<Object, BuiltinError> {
        let placeholder = Expr::EmptyArgument {
            span: Span::default(),
        };
        let args: Vec<BuiltinArgument> = values
            .into_iter()
            .map(|value| BuiltinArgument {
                expression: &placeholder,
                value,
            })
            .collect();
        let Some(Object::Builtin(builtin)) = lookup(name) else {
            panic!("{} is not a builtin function", name);
        };
        match (builtin.func)(&args)? {
            BuiltinOutcome::Value(value) => Ok(value),
            BuiltinOutcome::Reference { value, .. } => Ok(value),
        }
    }

    fn ints(values: &[i64]) -> Object {
        Object::new_array(values.iter().map(|n| Object::Integer(*n)).collect())
    }

    fn constant(name: &str) -> Object {
        lookup(name).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(matches!(lookup("length"), Some(Object::Builtin(_))));
        assert!(matches!(
            lookup("Hash_Sort"),
            Some(Object::Constant(BuiltinConstant {
                tag: ConstantTag::HashSort,
                value: 0x2000
            }))
        ));
        assert!(lookup("NOPE").is_none());
    }

    #[test]
    fn test_calc_modes() {
        let arr = || ints(&[4, 1, 5, 2, 3]);
        assert_eq!(call("CALCARRAY", vec![arr(), constant("CALC_MIN")]), Ok(Object::Integer(1)));
        assert_eq!(call("CALCARRAY", vec![arr(), constant("CALC_MAX")]), Ok(Object::Integer(5)));
        assert_eq!(call("CALCARRAY", vec![arr(), constant("CALC_AVR")]), Ok(Object::Integer(3)));
        assert_eq!(
            call("CALCARRAY", vec![arr(), constant("CALC_ADD"), Object::Integer(3), Object::Integer(99)]),
            Ok(Object::Integer(5))
        );
        assert_eq!(
            call("CALCARRAY", vec![arr(), constant("CALC_MIN"), Object::Integer(4), Object::Integer(1)]),
            Ok(Object::Null)
        );
    }

    #[test]
    fn test_calc_array_rejects_non_integer_elements() {
        let arr = Object::new_array(vec![Object::Integer(1), Object::String("x".to_string())]);
        assert_eq!(
            call("CALCARRAY", vec![arr, constant("CALC_ADD")]),
            Err(BuiltinError::NonIntegerElement {
                name: "CALCARRAY",
                index: 1,
                got: "STRING"
            })
        );
    }

    #[test]
    fn test_resize_pads_with_empty() {
        let resized = call("RESIZE", vec![ints(&[1, 2]), Object::Integer(3)]).unwrap();
        assert_eq!(
            resized,
            Object::new_array(vec![
                Object::Integer(1),
                Object::Integer(2),
                Object::Empty,
                Object::Empty
            ])
        );
        assert_eq!(call("RESIZE", vec![ints(&[1, 2, 3]), Object::Integer(0)]), Ok(ints(&[1])));
    }

    #[test]
    fn test_resize_rejects_unallocatable_sizes() {
        for size in [-2, i64::MAX, 1 << 60, MAX_ARRAY_SLOTS as i64] {
            let error = call("RESIZE", vec![ints(&[1]), Object::Integer(size)]).unwrap_err();
            assert!(
                matches!(error, BuiltinError::ValueRange { name: "RESIZE", position: 2, .. }),
                "size {}: {:?}",
                size,
                error
            );
        }
        assert_eq!(
            call("RESIZE", vec![ints(&[1]), Object::Integer(-2)]).unwrap_err().to_string(),
            format!(
                "argument 2 to `RESIZE` out of range: size -2 is not between -1 and {}",
                MAX_ARRAY_SLOTS - 1
            )
        );
    }

    #[test]
    fn test_slice_and_join() {
        let sliced = call("SLICE", vec![ints(&[1, 2, 3, 4]), Object::Integer(1), Object::Integer(2)]);
        assert_eq!(sliced, Ok(ints(&[2, 3])));
        assert_eq!(
            call("JOIN", vec![ints(&[1, 2, 3]), Object::String("-".to_string())]),
            Ok(Object::String("1-2-3".to_string()))
        );
        assert_eq!(call("JOIN", vec![ints(&[1, 2])]), Ok(Object::String("1 2".to_string())));
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(
            call("LENGTH", vec![]).unwrap_err().to_string(),
            "wrong number of arguments to `LENGTH`. got=0, want=1"
        );
        assert_eq!(
            call("LENGTH", vec![Object::Integer(3)]).unwrap_err().to_string(),
            "argument 1 to `LENGTH` not supported, got INTEGER"
        );
    }
}
