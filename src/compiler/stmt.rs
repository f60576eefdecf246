use crate::{
    ast::{expressions::Location, statements::Stmt},
    errors::errors::LowerError,
};

use super::{
    compiler::Compiler,
    expr::{element_type, gen_expression, Value},
    ir::Instr,
};

pub fn gen_statement(compiler: &mut Compiler, statement: &Stmt) -> Result<(), LowerError> {
    match statement {
        Stmt::Assign(location, value) => match location {
            Location::Simple(name) => {
                let value = gen_expression(compiler, value)?;
                gen_store_simple(compiler, name, value);
                Ok(())
            }
            Location::Array(name, index) => {
                let index = gen_expression(compiler, index)?;
                let value = gen_expression(compiler, value)?;
                compiler.emit(Instr::StoreA {
                    src: value.register,
                    name: name.clone(),
                    index: index.register,
                });
                Ok(())
            }
        },
        Stmt::Print(text) => {
            compiler.emit(Instr::PrintS(text.clone()));
            Ok(())
        }
        Stmt::Write(value) => {
            let value = gen_expression(compiler, value)?;
            let kind = value
                .ty
                .scalar()
                .ok_or(LowerError::NotAValue { ty: value.ty })?;
            compiler.emit(Instr::Print {
                kind,
                src: value.register,
            });
            Ok(())
        }
        Stmt::Read(location) => match location {
            Location::Simple(name) => {
                let ty = compiler.variable_type(name)?;
                let kind = ty.scalar().ok_or(LowerError::NotAValue { ty })?;
                let dst = compiler.allocator.fresh();
                compiler.emit(Instr::Read {
                    kind,
                    dst: dst.clone(),
                });
                gen_store_simple(compiler, name, Value { register: dst, ty });
                Ok(())
            }
            Location::Array(name, index) => {
                let ty = element_type(compiler, name)?;
                let kind = ty.scalar().ok_or(LowerError::NotAValue { ty })?;
                let index = gen_expression(compiler, index)?;
                let dst = compiler.allocator.fresh();
                compiler.emit(Instr::Read {
                    kind,
                    dst: dst.clone(),
                });
                compiler.emit(Instr::StoreA {
                    src: dst,
                    name: name.clone(),
                    index: index.register,
                });
                Ok(())
            }
        },
        Stmt::While(condition, body) => {
            let id = compiler.allocator.fresh_label_id();
            let start = format!("while{}", id);
            let entry = format!("whilebody{}", id);
            let end = format!("endwhile{}", id);

            // The condition and body run again after a back edge, so every
            // name the body writes is read from its slot at the loop head.
            let written = written_names(body);

            compiler.emit(Instr::Label(start.clone()));
            reload_all(compiler, &written);
            let condition = gen_expression(compiler, condition)?;
            compiler.emit(Instr::CBranch {
                cond: condition.register,
                on_true: entry.clone(),
                on_false: end.clone(),
            });
            compiler.emit(Instr::Label(entry));

            compiler.loop_exits.push(end.clone());
            gen_statement(compiler, body)?;
            compiler.loop_exits.pop();

            compiler.emit(Instr::Branch(start));
            compiler.emit(Instr::Label(end));
            reload_all(compiler, &written);
            Ok(())
        }
        Stmt::Break => {
            let end = compiler
                .loop_exits
                .last()
                .cloned()
                .ok_or_else(|| LowerError::BreakOutsideLoop {
                    function: compiler.function.clone(),
                })?;
            compiler.emit(Instr::Branch(end));
            Ok(())
        }
        Stmt::If(condition, then_body, else_body) => {
            let id = compiler.allocator.fresh_label_id();
            let then_label = format!("then{}", id);
            let else_label = format!("else{}", id);
            let end = format!("endif{}", id);

            let condition = gen_expression(compiler, condition)?;
            compiler.emit(Instr::CBranch {
                cond: condition.register,
                on_true: then_label.clone(),
                on_false: if else_body.is_some() {
                    else_label.clone()
                } else {
                    end.clone()
                },
            });

            compiler.emit(Instr::Label(then_label));
            gen_statement(compiler, then_body)?;

            if let Some(else_body) = else_body {
                compiler.emit(Instr::Branch(end.clone()));
                compiler.emit(Instr::Label(else_label));
                gen_statement(compiler, else_body)?;
            }

            compiler.emit(Instr::Label(end));
            reload_all(compiler, &written_names(statement));
            Ok(())
        }
        Stmt::Return(value) => {
            let value = gen_expression(compiler, value)?;
            compiler.emit(Instr::Ret {
                src: value.register,
            });
            Ok(())
        }
        Stmt::Skip => Ok(()),
        Stmt::Block(body) => {
            for stmt in body.iter() {
                gen_statement(compiler, stmt)?;
            }
            Ok(())
        }
    }
}

/// Writes `value` into `name` and makes it the register `name` resolves to
/// from now on.
fn gen_store_simple(compiler: &mut Compiler, name: &str, value: Value) {
    compiler.emit(Instr::StoreI {
        src: value.register.clone(),
        name: name.to_string(),
    });
    compiler.allocator.bind(name, value.register);
}

/// Scalar names `statement` may write, in order of first appearance.
fn written_names(statement: &Stmt) -> Vec<String> {
    fn collect(statement: &Stmt, names: &mut Vec<String>) {
        match statement {
            Stmt::Assign(Location::Simple(name), _) | Stmt::Read(Location::Simple(name)) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Stmt::While(_, body) => collect(body, names),
            Stmt::If(_, then_body, else_body) => {
                collect(then_body, names);
                if let Some(else_body) = else_body {
                    collect(else_body, names);
                }
            }
            Stmt::Block(body) => {
                for stmt in body.iter() {
                    collect(stmt, names);
                }
            }
            _ => {}
        }
    }

    let mut names = vec![];
    collect(statement, &mut names);
    names
}

/// Where control flow joins, registers bound on one path are unset on the
/// others. The named slot is the only value every path agrees on.
fn reload_all(compiler: &mut Compiler, names: &[String]) {
    for name in names.iter() {
        compiler.reload(name);
    }
}
