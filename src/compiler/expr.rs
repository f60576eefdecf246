use crate::{
    ast::{
        expressions::{Expr, Location, Operator},
        types::ScalarType,
    },
    errors::errors::LowerError,
    type_system::type_system::Type,
};

use super::{
    compiler::Compiler,
    ir::{Instr, Register},
};

/// Where an expression's result ended up, and what it is.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub register: Register,
    pub ty: Type,
}

impl Value {
    fn new(register: Register, ty: Type) -> Self {
        Value { register, ty }
    }

    fn scalar(&self) -> Result<ScalarType, LowerError> {
        self.ty.scalar().ok_or(LowerError::NotAValue { ty: self.ty })
    }
}

/// Generates IR for the given expression and returns the register holding
/// its result.
///
/// Operands are lowered left to right.
pub fn gen_expression(compiler: &mut Compiler, expression: &Expr) -> Result<Value, LowerError> {
    match expression {
        Expr::Int(value) => {
            let dst = compiler.allocator.fresh();
            compiler.emit(Instr::MovI {
                value: *value,
                dst: dst.clone(),
            });
            Ok(Value::new(dst, Type::Int))
        }
        Expr::Float(value) => {
            let dst = compiler.allocator.fresh();
            compiler.emit(Instr::MovF {
                value: *value,
                dst: dst.clone(),
            });
            Ok(Value::new(dst, Type::Float))
        }
        Expr::Location(location) => gen_load(compiler, location),
        Expr::TypeCast(target, inner) => {
            let inner = gen_expression(compiler, inner)?;
            let converted = match (inner.ty.scalar(), target) {
                (Some(ScalarType::Int), ScalarType::Float) => {
                    let dst = compiler.allocator.fresh();
                    compiler.emit(Instr::IToF {
                        src: inner.register,
                        dst: dst.clone(),
                    });
                    dst
                }
                (Some(ScalarType::Float), ScalarType::Int) => {
                    let dst = compiler.allocator.fresh();
                    compiler.emit(Instr::FToI {
                        src: inner.register,
                        dst: dst.clone(),
                    });
                    dst
                }
                // Same type, or a trusted cast of a non-number: only the type changes.
                _ => inner.register,
            };
            Ok(Value::new(converted, (*target).into()))
        }
        Expr::Call(name, arguments) => {
            let return_type = compiler.callee(name)?.return_type.unwrap_or(Type::Void);

            let mut args = vec![];
            for argument in arguments.iter() {
                args.push(gen_expression(compiler, argument)?.register);
            }

            let dst = compiler.allocator.fresh();
            compiler.emit(Instr::Call {
                name: name.clone(),
                args,
                dst: dst.clone(),
            });
            Ok(Value::new(dst, return_type))
        }
        Expr::Binary(op, left, right) => {
            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;
            let kind = left.scalar()?;

            let dst = compiler.allocator.fresh();
            compiler.emit(Instr::Arith {
                op: *op,
                kind,
                left: left.register,
                right: right.register,
                dst: dst.clone(),
            });
            Ok(Value::new(dst, left.ty))
        }
        Expr::Logical(op, left, right) => {
            let left = gen_expression(compiler, left)?;
            let right = gen_expression(compiler, right)?;

            let dst = compiler.allocator.fresh();
            let instr = match op {
                Operator::And => Instr::And {
                    left: left.register,
                    right: right.register,
                    dst: dst.clone(),
                },
                Operator::Or => Instr::Or {
                    left: left.register,
                    right: right.register,
                    dst: dst.clone(),
                },
                _ => Instr::Cmp {
                    op: *op,
                    kind: left.scalar()?,
                    left: left.register,
                    right: right.register,
                    dst: dst.clone(),
                },
            };
            compiler.emit(instr);
            Ok(Value::new(dst, Type::Bool))
        }
        Expr::Unary(op, operand) => {
            let operand = gen_expression(compiler, operand)?;
            match op {
                Operator::Not => {
                    let dst = compiler.allocator.fresh();
                    compiler.emit(Instr::Not {
                        src: operand.register,
                        dst: dst.clone(),
                    });
                    Ok(Value::new(dst, Type::Bool))
                }
                Operator::Minus => {
                    // -x is lowered as 0 - x.
                    let kind = operand.scalar()?;
                    let zero = compiler.allocator.fresh();
                    compiler.emit(match kind {
                        ScalarType::Int => Instr::MovI {
                            value: 0,
                            dst: zero.clone(),
                        },
                        ScalarType::Float => Instr::MovF {
                            value: 0.0,
                            dst: zero.clone(),
                        },
                    });

                    let dst = compiler.allocator.fresh();
                    compiler.emit(Instr::Arith {
                        op: Operator::Minus,
                        kind,
                        left: zero,
                        right: operand.register,
                        dst: dst.clone(),
                    });
                    Ok(Value::new(dst, operand.ty))
                }
                Operator::Plus => Ok(operand),
                _ => Err(LowerError::UnsupportedOperator {
                    operator: op.to_string(),
                }),
            }
        }
    }
}

/// Reads a location: scalars resolve through the binding map, array
/// elements are loaded.
pub fn gen_load(compiler: &mut Compiler, location: &Location) -> Result<Value, LowerError> {
    match location {
        Location::Simple(name) => {
            let register = compiler.bound(name)?;
            Ok(Value::new(register, compiler.variable_type(name)?))
        }
        Location::Array(name, index) => {
            let element = element_type(compiler, name)?;
            let index = gen_expression(compiler, index)?;

            let dst = compiler.allocator.fresh();
            compiler.emit(Instr::LoadA {
                name: name.clone(),
                index: index.register,
                dst: dst.clone(),
            });
            Ok(Value::new(dst, element))
        }
    }
}

/// Element type of the array `name`.
pub fn element_type(compiler: &Compiler, name: &str) -> Result<Type, LowerError> {
    match compiler.variable_type(name)? {
        Type::Array(scalar, _) => Ok(scalar.into()),
        ty => Err(LowerError::NotAValue { ty }),
    }
}
