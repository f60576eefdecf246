use log::{debug, trace};

use crate::{
    ast::{
        ast::{FunctionDef, Program},
        expressions::{Expr, Location},
        statements::Stmt,
        types::DataType,
    },
    errors::errors::{CheckError, Diagnostic},
    symbol_table::symbol_table::{
        FunctionDecl, ParameterDecl, ScopeId, ScopeTree, Symbol, VariableDecl,
    },
    type_system::type_system::{check_binary_op, check_cast, check_unary_op, Type},
    Options,
};

/// Output of a checker run: the decorated scopes and everything found wrong.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub scopes: ScopeTree,
    pub diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Traversal state for one checker run.
///
/// The checker is the only owner of the scope tree while it runs and hands it
/// back, read-only, through [`CheckResult`].
pub struct Checker<'a> {
    options: &'a Options,
    scopes: ScopeTree,
    current: ScopeId,
    /// Number of `while` bodies enclosing the current statement.
    loop_depth: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    pub fn new(options: &'a Options) -> Self {
        Checker {
            options,
            scopes: ScopeTree::new(),
            current: ScopeTree::GLOBAL,
            loop_depth: 0,
            diagnostics: vec![],
        }
    }

    pub fn finish(self) -> CheckResult {
        CheckResult {
            scopes: self.scopes,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        trace!("{}: {}", diagnostic.code(), diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn check_program(&mut self, program: &Program) -> Result<(), CheckError> {
        for function in program.functions.iter() {
            self.check_function(function)?;
        }

        let options = self.options;
        let entry_point = &options.entry_point;
        if self
            .scopes
            .resolve_function(ScopeTree::GLOBAL, entry_point)
            .is_none()
        {
            self.report(Diagnostic::MissingEntryPoint {
                name: entry_point.clone(),
            });
        }

        debug!(
            "checked {} function(s), {} diagnostic(s)",
            program.functions.len(),
            self.diagnostics.len()
        );
        Ok(())
    }

    /// Declares the function before its body is visited, so it can call itself.
    fn check_function(&mut self, function: &FunctionDef) -> Result<(), CheckError> {
        debug!("checking function {}", function.name);

        self.scopes.declare(
            ScopeTree::GLOBAL,
            &function.name,
            Symbol::Function(FunctionDecl {
                name: function.name.clone(),
                parameters: function
                    .parameters
                    .iter()
                    .map(|param| (param.name.clone(), param.ty))
                    .collect(),
                return_type: None,
                body: None,
            }),
        )?;

        let scope = self
            .scopes
            .create(Some(ScopeTree::GLOBAL), Some(function.name.as_str()));
        if let Some(decl) = self.scopes.resolve_function_mut(ScopeTree::GLOBAL, &function.name) {
            decl.body = Some(scope);
        }

        for param in function.parameters.iter() {
            self.scopes.declare(
                scope,
                &param.name,
                Symbol::Parameter(ParameterDecl { ty: param.ty }),
            )?;
        }
        for local in function.locals.iter() {
            self.scopes.declare(
                scope,
                &local.name,
                Symbol::Variable(VariableDecl { ty: local.ty }),
            )?;
        }

        let previous = self.current;
        self.current = scope;
        self.loop_depth = 0;
        for stmt in function.body.iter() {
            self.check_stmt(stmt);
        }
        self.current = previous;

        Ok(())
    }

    pub fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(location, value) => {
                let target = self.check_location(location);
                let value = self.check_expr(value);
                if let (Some(expected), Some(found)) = (target, value) {
                    if expected != found {
                        self.report(Diagnostic::AssignmentMismatch {
                            name: location.name().to_string(),
                            expected,
                            found,
                        });
                    }
                }
            }
            Stmt::Print(_) | Stmt::Skip => {}
            Stmt::Write(value) => {
                if let Some(ty) = self.check_expr(value) {
                    if !ty.is_numeric() {
                        self.report(Diagnostic::UnaryOperatorMismatch {
                            operator: String::from("write"),
                            operand: ty,
                        });
                    }
                }
            }
            Stmt::Read(location) => {
                self.check_location(location);
            }
            Stmt::While(condition, body) => {
                self.check_condition(condition);
                self.loop_depth += 1;
                self.check_stmt(body);
                self.loop_depth -= 1;
            }
            Stmt::Break => {
                if self.loop_depth == 0 {
                    self.report(Diagnostic::BreakOutsideLoop);
                }
            }
            Stmt::If(condition, then_body, else_body) => {
                self.check_condition(condition);
                self.check_stmt(then_body);
                if let Some(else_body) = else_body {
                    self.check_stmt(else_body);
                }
            }
            Stmt::Return(value) => {
                if let Some(found) = self.check_expr(value) {
                    self.infer_return_type(found);
                }
            }
            Stmt::Block(body) => {
                for stmt in body.iter() {
                    self.check_stmt(stmt);
                }
            }
        }
    }

    /// The first `return` fixes the function's type, later ones must agree.
    fn infer_return_type(&mut self, found: Type) {
        let Some(name) = self.scopes.owning_function(self.current).map(str::to_string) else {
            return;
        };
        let Some(function) = self.scopes.resolve_function_mut(self.current, &name) else {
            return;
        };

        let conflict = match function.return_type {
            None => {
                function.return_type = Some(found);
                None
            }
            Some(expected) => (expected != found).then_some(expected),
        };

        if let Some(expected) = conflict {
            self.report(Diagnostic::ReturnTypeConflict {
                name,
                expected,
                found,
            });
        }
    }

    fn check_condition(&mut self, condition: &Expr) {
        if let Some(found) = self.check_expr(condition) {
            if found != Type::Bool {
                self.report(Diagnostic::ConditionNotBool { found });
            }
        }
    }

    /// Type of a location, `None` once something about it has been reported.
    pub fn check_location(&mut self, location: &Location) -> Option<Type> {
        let declared = self
            .scopes
            .resolve_variable(self.current, location.name())
            .and_then(Symbol::data_type);

        match location {
            Location::Simple(name) => match declared {
                None => {
                    self.report(Diagnostic::UndefinedName { name: name.clone() });
                    None
                }
                Some(DataType::Array(..)) => {
                    self.report(Diagnostic::ArrayWithoutIndex { name: name.clone() });
                    None
                }
                Some(DataType::Simple(scalar)) => Some(scalar.into()),
            },
            Location::Array(name, index) => {
                if declared.is_none() {
                    self.report(Diagnostic::UndefinedName { name: name.clone() });
                }

                if let Some(found) = self.check_expr(index) {
                    if found != Type::Int {
                        self.report(Diagnostic::IndexNotInt {
                            name: name.clone(),
                            found,
                        });
                    }
                }

                match declared? {
                    DataType::Simple(_) => {
                        self.report(Diagnostic::IndexOnScalar { name: name.clone() });
                        None
                    }
                    DataType::Array(scalar, _) => Some(scalar.into()),
                }
            }
        }
    }

    /// Type of an expression, `None` meaning "already reported".
    pub fn check_expr(&mut self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Int(_) => Some(Type::Int),
            Expr::Float(_) => Some(Type::Float),
            Expr::Location(location) => self.check_location(location),
            Expr::TypeCast(target, inner) => {
                // The inner expression is checked for its own diagnostics,
                // its type has no say in the result.
                self.check_expr(inner);
                Some(check_cast(*target))
            }
            Expr::Call(name, arguments) => self.check_call(name, arguments),
            Expr::Binary(op, left, right) | Expr::Logical(op, left, right) => {
                // Both sides are visited even when the left one already failed.
                let left = self.check_expr(left);
                let right = self.check_expr(right);
                let (left, right) = (left?, right?);
                let result = check_binary_op(*op, left, right);
                if result.is_none() {
                    self.report(Diagnostic::OperatorMismatch {
                        operator: op.to_string(),
                        left,
                        right,
                    });
                }
                result
            }
            Expr::Unary(op, operand) => {
                let operand = self.check_expr(operand)?;
                let result = check_unary_op(*op, operand);
                if result.is_none() {
                    self.report(Diagnostic::UnaryOperatorMismatch {
                        operator: op.to_string(),
                        operand,
                    });
                }
                result
            }
        }
    }

    fn check_call(&mut self, name: &str, arguments: &[Expr]) -> Option<Type> {
        let callee = self
            .scopes
            .resolve_function(self.current, name)
            .map(|function| (function.parameters.clone(), function.return_type));

        let argument_types: Vec<Option<Type>> =
            arguments.iter().map(|arg| self.check_expr(arg)).collect();

        let Some((parameters, return_type)) = callee else {
            self.report(Diagnostic::UndefinedFunction {
                name: name.to_string(),
            });
            return None;
        };

        if parameters.len() != argument_types.len() {
            self.report(Diagnostic::ArgumentCountMismatch {
                name: name.to_string(),
                expected: parameters.len(),
                received: argument_types.len(),
            });
            return None;
        }

        let mut matched = true;
        for (position, ((_, expected), received)) in
            parameters.iter().zip(argument_types).enumerate()
        {
            let expected = Type::from(*expected);
            match received {
                Some(received) if received != expected => {
                    self.report(Diagnostic::ArgumentTypeMismatch {
                        name: name.to_string(),
                        position: position + 1,
                        expected,
                        received,
                    });
                    matched = false;
                }
                Some(_) => {}
                None => matched = false,
            }
        }

        if !matched {
            return None;
        }

        match return_type {
            Some(ty) => Some(ty),
            // A recursive call ahead of the first `return`: not known yet.
            None if self.scopes.owning_function(self.current) == Some(name) => None,
            // A finished function that never returns produces no value.
            None => Some(Type::Void),
        }
    }
}

/// Runs the checker over `program` with a fresh global scope.
///
/// # Returns
///
/// The decorated scope tree and the ordered diagnostics, or a fatal
/// [`CheckError`] when a name is declared twice in one scope.
pub fn check(program: &Program, options: &Options) -> Result<CheckResult, CheckError> {
    let mut checker = Checker::new(options);
    checker.check_program(program)?;
    Ok(checker.finish())
}
