use crate::ast::{BlockStmt, Expr, Identifier, InfixOp, PrefixOp, Program, Stmt};
use crate::builtins;
use crate::config::InterpreterConfig;
use crate::environment::{EnvRef, Environment};
use crate::error::{ScriptError, Span};
use crate::object::{
    array_slots, BuiltinArgument, BuiltinConstant, BuiltinOutcome, ConstantTag, Function,
    HashTable, Object,
};
use std::rc::Rc;
use tracing::{debug, trace};

/// How a statement finished.
#[derive(Debug)]
enum Flow {
    Normal(Option<Object>),
    /// A `RESULT = ...` statement ran; the enclosing function returns.
    Result(Object),
    Continue(Span),
    Break(Span),
}

/// Evaluates `program` in `env` with the default configuration, folding any
/// failure into `Object::Error`.
pub fn evaluate(program: &Program, env: &EnvRef) -> Object {
    let mut evaluator = Evaluator::with_env(Rc::clone(env), InterpreterConfig::default());
    match evaluator.evaluate_program(program) {
        Ok(value) => value,
        Err(error) => Object::Error {
            message: error.message,
        },
    }
}

pub struct Evaluator {
    env: EnvRef,
    depth: usize,
    config: InterpreterConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(InterpreterConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: InterpreterConfig) -> Self {
        Self::with_env(Environment::new().into_ref(), config)
    }

    pub fn with_env(env: EnvRef, config: InterpreterConfig) -> Self {
        Self {
            env,
            depth: 0,
            config,
        }
    }

    pub fn env(&self) -> &EnvRef {
        &self.env
    }

    /// Runs every statement and yields the value of the last one (`Null` when
    /// it produced none). A top-level `RESULT` stops the program with its value.
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Object, ScriptError> {
        debug!(statements = program.statements.len(), "evaluating program");

        // Top-level functions are callable before their declaration.
        for statement in &program.statements {
            if let Stmt::Function { .. } = statement {
                self.execute(statement)?;
            }
        }

        let mut last = None;
        for statement in &program.statements {
            if let Stmt::Function { .. } = statement {
                continue;
            }
            match self.execute(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Result(value) => {
                    debug!("program stopped by RESULT");
                    return Ok(value);
                }
                Flow::Continue(span) => return Err(loop_control_error("CONTINUE", span)),
                Flow::Break(span) => return Err(loop_control_error("BREAK", span)),
            }
        }

        debug!("program finished");
        Ok(last.unwrap_or(Object::Null))
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, ScriptError> {
        match stmt {
            Stmt::Dim {
                name,
                value,
                is_public,
                ..
            } => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Object::Empty,
                };
                let scope = if *is_public {
                    Environment::root(&self.env)
                } else {
                    Rc::clone(&self.env)
                };
                let result = scope.borrow_mut().define(&name.name, value);
                result.map_err(|error| ScriptError::runtime_error(name.span, error.to_string()))?;
                Ok(Flow::Normal(None))
            }
            Stmt::Const { name, value, .. } => {
                let value = self.evaluate_expression(value)?;
                let result = self.env.borrow_mut().set_const(&name.name, value);
                result.map_err(|error| ScriptError::runtime_error(name.span, error.to_string()))?;
                Ok(Flow::Normal(None))
            }
            Stmt::HashTable { name, option, .. } => {
                let table = match option {
                    Some(option) => self.hash_table_from_option(option)?,
                    None => HashTable::new(false, false),
                };
                let result = self
                    .env
                    .borrow_mut()
                    .define(&name.name, Object::new_hash_table(table));
                result.map_err(|error| ScriptError::runtime_error(name.span, error.to_string()))?;
                Ok(Flow::Normal(None))
            }
            Stmt::Expression { expr, .. } => Ok(Flow::Normal(Some(self.evaluate_expression(expr)?))),
            Stmt::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute(consequence)
                } else if let Some(alternative) = alternative {
                    self.execute(alternative)
                } else {
                    Ok(Flow::Normal(Some(Object::Null)))
                }
            }
            Stmt::IfBlock {
                condition,
                consequence,
                alternative,
                ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_block(consequence)
                } else if let Some(alternative) = alternative {
                    self.execute(alternative)
                } else {
                    Ok(Flow::Normal(Some(Object::Null)))
                }
            }
            Stmt::Block(block) => self.execute_block(block),
            Stmt::Function {
                name,
                parameters,
                body,
                is_procedure,
                ..
            } => {
                let function = Function {
                    name: name.name.clone(),
                    parameters: parameters.iter().map(|p| p.name.clone()).collect(),
                    body: Rc::new(body.clone()),
                    env: Rc::clone(&self.env),
                    is_procedure: *is_procedure,
                };
                let result = self
                    .env
                    .borrow_mut()
                    .define(&name.name, Object::Function(Rc::new(function)));
                result.map_err(|error| ScriptError::runtime_error(name.span, error.to_string()))?;
                Ok(Flow::Normal(None))
            }
            Stmt::Result { value, span } => {
                let value = self.evaluate_expression(value)?;
                // Blocks share the function scope, so this lands in the call's result slot.
                let result = self.env.borrow_mut().define("RESULT", value.clone());
                result.map_err(|error| ScriptError::runtime_error(*span, error.to_string()))?;
                Ok(Flow::Result(value))
            }
            Stmt::ForToStep {
                variable,
                from,
                to,
                step,
                body,
                ..
            } => self.execute_for_to_step(variable, from, to, step.as_ref(), body),
            Stmt::ForIn {
                variable,
                collection,
                body,
                ..
            } => self.execute_for_in(variable, collection, body),
            Stmt::Continue { span } => Ok(Flow::Continue(*span)),
            Stmt::Break { span } => Ok(Flow::Break(*span)),
        }
    }

    /// Blocks share the enclosing scope; the first non-normal flow ends the block.
    fn execute_block(&mut self, block: &BlockStmt) -> Result<Flow, ScriptError> {
        let mut last = None;
        for statement in &block.statements {
            match self.execute(statement)? {
                Flow::Normal(value) => last = value,
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn hash_table_from_option(&mut self, option: &Expr) -> Result<HashTable, ScriptError> {
        let flags = match self.evaluate_expression(option)? {
            Object::Constant(BuiltinConstant {
                tag: ConstantTag::HashCaseCare | ConstantTag::HashSort,
                value,
            }) => value,
            Object::Integer(value) => value,
            _ => 0,
        };

        let case_care = builtin_value(ConstantTag::HashCaseCare);
        let sort = builtin_value(ConstantTag::HashSort);
        if flags == 0 || flags & !(case_care | sort) != 0 {
            return Err(ScriptError::runtime_error_with_help(
                option.span(),
                format!("unknown hash declare: {}", option),
                "combine HASH_CASECARE and HASH_SORT, e.g. HASHTBL h = HASH_CASECARE + HASH_SORT"
                    .to_string(),
            ));
        }

        Ok(HashTable::new(flags & sort != 0, flags & case_care != 0))
    }

    fn execute_for_to_step(
        &mut self,
        variable: &Identifier,
        from: &Expr,
        to: &Expr,
        step: Option<&Expr>,
        body: &BlockStmt,
    ) -> Result<Flow, ScriptError> {
        let from = literal_bound(from)?;
        let to = literal_bound(to)?;
        let step = match step {
            Some(step) => {
                let value = literal_bound(step)?;
                if value == 0 {
                    return Err(ScriptError::runtime_error(
                        step.span(),
                        "for loop step must not be zero".to_string(),
                    ));
                }
                value
            }
            None => 1,
        };

        let mut counter = from;
        while (step > 0 && counter <= to) || (step < 0 && counter >= to) {
            self.assign_variable(variable, Object::Integer(counter))?;
            match self.execute_block(body)? {
                Flow::Normal(_) | Flow::Continue(_) => {}
                Flow::Break(_) => break,
                Flow::Result(value) => return Ok(Flow::Result(value)),
            }
            counter = match counter.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(Flow::Normal(None))
    }

    fn execute_for_in(
        &mut self,
        variable: &Identifier,
        collection: &Identifier,
        body: &BlockStmt,
    ) -> Result<Flow, ScriptError> {
        let elements = match self.lookup_identifier(collection)? {
            Object::Array(elements) => elements.borrow().clone(),
            other => {
                return Err(ScriptError::runtime_error(
                    collection.span,
                    format!(
                        "for-in collection must be an array: {} is {}",
                        collection.name,
                        other.type_name()
                    ),
                ))
            }
        };

        for element in elements {
            self.assign_variable(variable, element)?;
            match self.execute_block(body)? {
                Flow::Normal(_) | Flow::Continue(_) => {}
                Flow::Break(_) => break,
                Flow::Result(value) => return Ok(Flow::Result(value)),
            }
        }
        Ok(Flow::Normal(None))
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Object, ScriptError> {
        match expr {
            Expr::Identifier(ident) => self.lookup_identifier(ident),
            Expr::Integer { value, .. } => Ok(Object::Integer(*value)),
            Expr::String { value, .. } => Ok(Object::String(value.clone())),
            Expr::Boolean { value, .. } => Ok(Object::Boolean(*value)),
            Expr::Prefix {
                operator,
                right,
                span,
            } => {
                let right = self.evaluate_expression(right)?;
                evaluate_prefix(*operator, right, *span)
            }
            Expr::Infix {
                left,
                operator,
                right,
                span,
            } => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                evaluate_infix(*operator, left, right, *span)
            }
            Expr::Assign { target, value, span } => {
                let value = self.evaluate_expression(value)?;
                self.assign(target, value, *span)
            }
            Expr::Call {
                callee,
                arguments,
                span,
            } => self.evaluate_call(callee, arguments, *span),
            Expr::EmptyArgument { .. } => Ok(Object::Empty),
            Expr::Array { .. } => self.evaluate_array_literal(expr),
            Expr::Index {
                left,
                index,
                option,
                span,
            } => {
                let left = self.evaluate_expression(left)?;
                let index = self.evaluate_expression(index)?;
                let option = match option {
                    Some(option) => Some(self.evaluate_expression(option)?),
                    None => None,
                };
                evaluate_index(left, index, option, *span)
            }
        }
    }

    /// User bindings shadow builtins, which share one namespace with the named constants.
    fn lookup_identifier(&self, ident: &Identifier) -> Result<Object, ScriptError> {
        if let Some(value) = self.env.borrow().get(&ident.name) {
            return Ok(value);
        }
        builtins::lookup(&ident.name).ok_or_else(|| {
            ScriptError::runtime_error(ident.span, format!("identifier not found: {}", ident.name))
        })
    }

    fn assign_variable(&mut self, ident: &Identifier, value: Object) -> Result<(), ScriptError> {
        let result = self.env.borrow_mut().set(&ident.name, value);
        result.map_err(|error| ScriptError::runtime_error(ident.span, error.to_string()))
    }

    fn assign(&mut self, target: &Expr, value: Object, span: Span) -> Result<Object, ScriptError> {
        match target {
            Expr::Identifier(ident) => {
                let value = match value {
                    Object::Constant(BuiltinConstant {
                        tag: ConstantTag::HashRemoveAll,
                        ..
                    }) if matches!(self.env.borrow().get(&ident.name), Some(Object::HashTable(_))) => {
                        Object::new_hash_table(HashTable::new(false, false))
                    }
                    value => value,
                };
                self.assign_variable(ident, value.clone())?;
                Ok(value)
            }
            Expr::Index {
                left,
                index,
                option,
                ..
            } => {
                if let Some(option) = option {
                    return Err(ScriptError::runtime_error(
                        option.span(),
                        format!("cannot assign through an index option: {}", target),
                    ));
                }
                let container = self.evaluate_expression(left)?;
                let key = self.evaluate_expression(index)?;

                match container {
                    Object::Array(elements) => {
                        let Some(position) = as_integer(&key) else {
                            return Err(ScriptError::runtime_error(
                                index.span(),
                                format!("array index must be an integer, got {}", key.type_name()),
                            ));
                        };
                        let mut elements = elements.borrow_mut();
                        let len = elements.len();
                        match usize::try_from(position).ok().filter(|p| *p < len) {
                            Some(position) => elements[position] = value.clone(),
                            None => {
                                return Err(ScriptError::runtime_error_with_help(
                                    span,
                                    format!("index out of range: {} (length {})", target, len),
                                    "grow the array first with RESIZE(array, size)".to_string(),
                                ))
                            }
                        }
                    }
                    Object::HashTable(table) => {
                        let inserted = table.borrow_mut().insert(key.clone(), value.clone());
                        if inserted.is_none() {
                            return Err(ScriptError::runtime_error(
                                index.span(),
                                format!("unusable as hash key: {}", key.type_name()),
                            ));
                        }
                    }
                    other => {
                        return Err(ScriptError::runtime_error(
                            left.span(),
                            format!("index assignment not supported: {}", other.type_name()),
                        ))
                    }
                }
                Ok(value)
            }
            other => Err(ScriptError::runtime_error(
                other.span(),
                format!("cannot assign to {}", other),
            )),
        }
    }

    fn evaluate_array_literal(&mut self, literal: &Expr) -> Result<Object, ScriptError> {
        let Expr::Array {
            size,
            elements,
            span,
        } = literal
        else {
            return Err(ScriptError::runtime_error(
                literal.span(),
                format!("not an array literal: {}", literal),
            ));
        };
        let wrong_size = || {
            ScriptError::runtime_error(*span, format!("array has wrong size: {}", literal))
        };

        let slots = match size {
            Some(size) => match self.evaluate_expression(size)? {
                Object::Integer(n) => match array_slots(n) {
                    Some(slots) => Some(slots),
                    None => return Err(wrong_size()),
                },
                _ => return Err(wrong_size()),
            },
            None => None,
        };

        if elements.is_empty() {
            return Ok(Object::new_array(vec![Object::Empty; slots.unwrap_or(0)]));
        }
        if slots.is_some_and(|slots| slots != elements.len()) {
            return Err(wrong_size());
        }

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            values.push(self.evaluate_expression(element)?);
        }
        Ok(Object::new_array(values))
    }

    fn evaluate_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        span: Span,
    ) -> Result<Object, ScriptError> {
        let function = self.evaluate_expression(callee)?;
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate_expression(argument)?);
        }

        match function {
            Object::Function(function) => self.apply_function(&function, values, span),
            Object::Builtin(builtin) => {
                trace!(builtin = builtin.name, arguments = values.len(), "builtin call");
                let args: Vec<BuiltinArgument> = arguments
                    .iter()
                    .zip(values)
                    .map(|(expression, value)| BuiltinArgument { expression, value })
                    .collect();
                let outcome = (builtin.func)(&args)
                    .map_err(|error| ScriptError::runtime_error(span, error.to_string()))?;
                match outcome {
                    BuiltinOutcome::Value(value) => Ok(value),
                    BuiltinOutcome::Reference {
                        target,
                        value,
                        result,
                    } => {
                        self.assign(target, value, span)?;
                        Ok(result)
                    }
                }
            }
            other => Err(ScriptError::runtime_error(
                callee.span(),
                format!("not a function: {}", other.type_name()),
            )),
        }
    }

    fn apply_function(
        &mut self,
        function: &Function,
        mut arguments: Vec<Object>,
        span: Span,
    ) -> Result<Object, ScriptError> {
        if self.depth >= self.config.max_call_depth {
            return Err(ScriptError::runtime_error_with_help(
                span,
                "maximum call depth exceeded".to_string(),
                format!(
                    "calls may nest at most {} deep; check {} for unbounded recursion",
                    self.config.max_call_depth, function.name
                ),
            ));
        }
        if arguments.len() > function.parameters.len() {
            return Err(ScriptError::runtime_error(
                span,
                format!(
                    "wrong number of arguments to `{}`. got={}, want={}",
                    function.name,
                    arguments.len(),
                    function.parameters.len()
                ),
            ));
        }
        trace!(function = %function.name, arguments = arguments.len(), depth = self.depth, "call");

        let call_env = Environment::new_enclosed(&function.env);
        {
            let mut scope = call_env.borrow_mut();
            arguments.resize(function.parameters.len(), Object::Empty);
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                scope
                    .define(parameter, argument)
                    .map_err(|error| ScriptError::runtime_error(span, error.to_string()))?;
            }
            if !function.is_procedure {
                scope
                    .define("RESULT", Object::Null)
                    .map_err(|error| ScriptError::runtime_error(span, error.to_string()))?;
            }
        }

        let caller_env = std::mem::replace(&mut self.env, call_env);
        self.depth += 1;
        let flow = self.execute_block(&function.body);
        self.depth -= 1;
        self.env = caller_env;

        match flow? {
            Flow::Result(value) if !function.is_procedure => Ok(value),
            Flow::Result(_) => Err(ScriptError::runtime_error(
                span,
                format!("RESULT is not available in PROCEDURE {}", function.name),
            )),
            Flow::Normal(_) if function.is_procedure => Ok(Object::Null),
            Flow::Normal(_) => Err(ScriptError::runtime_error_with_help(
                span,
                "result value does not exist".to_string(),
                format!("assign the return value with RESULT = ... inside {}", function.name),
            )),
            Flow::Continue(span) => Err(loop_control_error("CONTINUE", span)),
            Flow::Break(span) => Err(loop_control_error("BREAK", span)),
        }
    }
}

fn loop_control_error(keyword: &str, span: Span) -> ScriptError {
    ScriptError::runtime_error_with_help(
        span,
        format!("{} outside of a loop", keyword),
        format!("{} must appear inside FOR ... NEXT", keyword),
    )
}

fn builtin_value(tag: ConstantTag) -> i64 {
    match builtins::lookup(tag.name()) {
        Some(Object::Constant(constant)) => constant.value,
        _ => 0,
    }
}

/// Loop bounds are integer literals, optionally negated.
fn literal_bound(expr: &Expr) -> Result<i64, ScriptError> {
    let value = match expr {
        Expr::Integer { value, .. } => Some(*value),
        Expr::Prefix {
            operator: PrefixOp::Negate,
            right,
            ..
        } => match right.as_ref() {
            Expr::Integer { value, .. } => value.checked_neg(),
            _ => None,
        },
        _ => None,
    };
    value.ok_or_else(|| {
        ScriptError::runtime_error(
            expr.span(),
            format!("for loop bound must be an integer literal: {}", expr),
        )
    })
}

/// Constants act as their integer value when used as operands.
fn as_operand(value: Object) -> Object {
    match value {
        Object::Constant(constant) => Object::Integer(constant.value),
        other => other,
    }
}

fn as_integer(value: &Object) -> Option<i64> {
    match value {
        Object::Integer(n) => Some(*n),
        Object::Constant(constant) => Some(constant.value),
        _ => None,
    }
}

fn evaluate_prefix(operator: PrefixOp, right: Object, span: Span) -> Result<Object, ScriptError> {
    match operator {
        PrefixOp::Not => Ok(Object::Boolean(!right.is_truthy())),
        PrefixOp::Negate => match as_operand(right) {
            Object::Integer(n) => n.checked_neg().map(Object::Integer).ok_or_else(|| {
                ScriptError::runtime_error(span, format!("integer overflow: -{}", n))
            }),
            other => Err(ScriptError::runtime_error(
                span,
                format!("unknown operator: -{}", other.type_name()),
            )),
        },
    }
}

fn evaluate_infix(
    operator: InfixOp,
    left: Object,
    right: Object,
    span: Span,
) -> Result<Object, ScriptError> {
    match (as_operand(left), as_operand(right)) {
        (Object::Integer(l), Object::Integer(r)) => evaluate_integer_infix(operator, l, r, span),
        (Object::String(l), Object::String(r)) if operator == InfixOp::Add => {
            Ok(Object::String(l + &r))
        }
        (l, r) if l.type_name() != r.type_name() => Err(ScriptError::runtime_error(
            span,
            format!(
                "type mismatch: {} {} {}",
                l.type_name(),
                operator,
                r.type_name()
            ),
        )),
        (l, r) => Err(ScriptError::runtime_error(
            span,
            format!(
                "unknown operator: {} {} {}",
                l.type_name(),
                operator,
                r.type_name()
            ),
        )),
    }
}

fn evaluate_integer_infix(operator: InfixOp, l: i64, r: i64, span: Span) -> Result<Object, ScriptError> {
    let checked = match operator {
        InfixOp::Add => l.checked_add(r),
        InfixOp::Subtract => l.checked_sub(r),
        InfixOp::Multiply => l.checked_mul(r),
        InfixOp::Divide | InfixOp::Mod if r == 0 => {
            return Err(ScriptError::runtime_error(span, "division by zero".to_string()))
        }
        InfixOp::Divide => l.checked_div(r),
        InfixOp::Mod => l.checked_rem(r),
        InfixOp::Equal => return Ok(Object::Boolean(l == r)),
        InfixOp::NotEqual => return Ok(Object::Boolean(l != r)),
        InfixOp::Less => return Ok(Object::Boolean(l < r)),
        InfixOp::LessEqual => return Ok(Object::Boolean(l <= r)),
        InfixOp::Greater => return Ok(Object::Boolean(l > r)),
        InfixOp::GreaterEqual => return Ok(Object::Boolean(l >= r)),
    };
    checked.map(Object::Integer).ok_or_else(|| {
        ScriptError::runtime_error(span, format!("integer overflow: {} {} {}", l, operator, r))
    })
}

fn evaluate_index(
    left: Object,
    index: Object,
    option: Option<Object>,
    span: Span,
) -> Result<Object, ScriptError> {
    match left {
        Object::Array(elements) => {
            if option.is_some() {
                return Err(ScriptError::runtime_error(
                    span,
                    "index option not supported: ARRAY".to_string(),
                ));
            }
            match as_integer(&index) {
                Some(position) => Ok(usize::try_from(position)
                    .ok()
                    .and_then(|p| elements.borrow().get(p).cloned())
                    .unwrap_or(Object::Null)),
                None => Err(ScriptError::runtime_error(
                    span,
                    format!("index operator not supported: ARRAY[{}]", index.type_name()),
                )),
            }
        }
        Object::HashTable(table) => {
            let unusable =
                || ScriptError::runtime_error(span, format!("unusable as hash key: {}", index.type_name()));

            let Some(option) = option else {
                let table = table.borrow();
                let value = table.get(&index).ok_or_else(unusable)?;
                return Ok(value.cloned().unwrap_or(Object::Null));
            };

            let tag = match option {
                Object::Constant(constant) => constant.tag,
                other => {
                    return Err(ScriptError::runtime_error(
                        span,
                        format!("unknown hash index option: {}", other),
                    ))
                }
            };
            match tag {
                ConstantTag::HashExists => {
                    let exists = table.borrow().contains(&index).ok_or_else(unusable)?;
                    Ok(Object::Boolean(exists))
                }
                ConstantTag::HashRemove => {
                    let removed = table.borrow_mut().remove(&index).ok_or_else(unusable)?;
                    Ok(Object::Boolean(removed))
                }
                ConstantTag::HashKey | ConstantTag::HashVal => {
                    let Some(position) = as_integer(&index) else {
                        return Err(ScriptError::runtime_error(
                            span,
                            format!("hash position must be an integer, got {}", index.type_name()),
                        ));
                    };
                    let table = table.borrow();
                    let pair = usize::try_from(position)
                        .ok()
                        .and_then(|p| table.pair_by_index(p));
                    Ok(match pair {
                        Some(pair) if tag == ConstantTag::HashKey => pair.key.clone(),
                        Some(pair) => pair.value.clone(),
                        None => Object::Null,
                    })
                }
                other => Err(ScriptError::runtime_error(
                    span,
                    format!("unknown hash index option: {}", other.name()),
                )),
            }
        }
        other => Err(ScriptError::runtime_error(
            span,
            format!("index operator not supported: {}", other.type_name()),
        )),
    }
}
