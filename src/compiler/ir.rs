//! Three-address instruction set.
//!
//! Every instruction renders in tuple form, e.g. `('ADDI', 'R1', 'R2', 'R3')`,
//! with the destination register last.

use std::fmt::Display;

use crate::ast::{expressions::Operator, types::ScalarType};

/// A virtual register. There is an unbounded supply of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register(pub String);

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// Binds a declared name to a register on function entry.
    LoadI { name: String, dst: Register },
    MovI { value: i64, dst: Register },
    MovF { value: f64, dst: Register },
    /// `ADDI`/`SUBI`/`MULI`/`DIVI` and their float counterparts.
    Arith {
        op: Operator,
        kind: ScalarType,
        left: Register,
        right: Register,
        dst: Register,
    },
    /// `CMPI`/`CMPF` with the relational operator as first operand.
    Cmp {
        op: Operator,
        kind: ScalarType,
        left: Register,
        right: Register,
        dst: Register,
    },
    And { left: Register, right: Register, dst: Register },
    Or { left: Register, right: Register, dst: Register },
    Not { src: Register, dst: Register },
    IToF { src: Register, dst: Register },
    FToI { src: Register, dst: Register },
    StoreI { src: Register, name: String },
    LoadA { name: String, index: Register, dst: Register },
    StoreA { src: Register, name: String, index: Register },
    Call { name: String, args: Vec<Register>, dst: Register },
    Ret { src: Register },
    Label(String),
    Branch(String),
    CBranch { cond: Register, on_true: String, on_false: String },
    Print { kind: ScalarType, src: Register },
    PrintS(String),
    Read { kind: ScalarType, dst: Register },
}

fn suffix(kind: ScalarType) -> char {
    match kind {
        ScalarType::Int => 'I',
        ScalarType::Float => 'F',
    }
}

impl Instr {
    pub fn opcode(&self) -> String {
        match self {
            Instr::LoadI { .. } => String::from("LOADI"),
            Instr::MovI { .. } => String::from("MOVI"),
            Instr::MovF { .. } => String::from("MOVF"),
            Instr::Arith { op, kind, .. } => {
                let stem = match op {
                    Operator::Plus => "ADD",
                    Operator::Minus => "SUB",
                    Operator::Star => "MUL",
                    _ => "DIV",
                };
                format!("{}{}", stem, suffix(*kind))
            }
            Instr::Cmp { kind, .. } => format!("CMP{}", suffix(*kind)),
            Instr::And { .. } => String::from("AND"),
            Instr::Or { .. } => String::from("OR"),
            Instr::Not { .. } => String::from("NOT"),
            Instr::IToF { .. } => String::from("ITOF"),
            Instr::FToI { .. } => String::from("FTOI"),
            Instr::StoreI { .. } => String::from("STOREI"),
            Instr::LoadA { .. } => String::from("LOADA"),
            Instr::StoreA { .. } => String::from("STOREA"),
            Instr::Call { .. } => String::from("CALL"),
            Instr::Ret { .. } => String::from("RET"),
            Instr::Label(_) => String::from("LABEL"),
            Instr::Branch(_) => String::from("BRANCH"),
            Instr::CBranch { .. } => String::from("CBRANCH"),
            Instr::Print { kind, .. } => format!("PRINT{}", suffix(*kind)),
            Instr::PrintS(_) => String::from("PRINTS"),
            Instr::Read { kind, .. } => format!("READ{}", suffix(*kind)),
        }
    }

    pub fn operands(&self) -> Vec<String> {
        match self {
            Instr::LoadI { name, dst } => vec![name.clone(), dst.to_string()],
            Instr::MovI { value, dst } => vec![value.to_string(), dst.to_string()],
            Instr::MovF { value, dst } => vec![format!("{:?}", value), dst.to_string()],
            Instr::Arith { left, right, dst, .. }
            | Instr::And { left, right, dst }
            | Instr::Or { left, right, dst } => {
                vec![left.to_string(), right.to_string(), dst.to_string()]
            }
            Instr::Cmp { op, left, right, dst, .. } => vec![
                op.to_string(),
                left.to_string(),
                right.to_string(),
                dst.to_string(),
            ],
            Instr::Not { src, dst } | Instr::IToF { src, dst } | Instr::FToI { src, dst } => {
                vec![src.to_string(), dst.to_string()]
            }
            Instr::StoreI { src, name } => vec![src.to_string(), name.clone()],
            Instr::LoadA { name, index, dst } => {
                vec![name.clone(), index.to_string(), dst.to_string()]
            }
            Instr::StoreA { src, name, index } => {
                vec![src.to_string(), name.clone(), index.to_string()]
            }
            Instr::Call { name, args, dst } => std::iter::once(name.clone())
                .chain(args.iter().map(Register::to_string))
                .chain(std::iter::once(dst.to_string()))
                .collect(),
            Instr::Ret { src } => vec![src.to_string()],
            Instr::Label(label) | Instr::Branch(label) => vec![label.clone()],
            Instr::CBranch { cond, on_true, on_false } => {
                vec![cond.to_string(), on_true.clone(), on_false.clone()]
            }
            Instr::Print { src, .. } => vec![src.to_string()],
            Instr::PrintS(text) => vec![format!("{:?}", text)],
            Instr::Read { dst, .. } => vec![dst.to_string()],
        }
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "('{}'", self.opcode())?;
        for operand in self.operands() {
            write!(f, ", '{}'", operand)?;
        }
        write!(f, ")")
    }
}

/// The lowered body of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionIR {
    pub name: String,
    pub instrs: Vec<Instr>,
}

/// Lowered program, functions kept in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramIR {
    pub functions: Vec<FunctionIR>,
}

impl ProgramIR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionIR> {
        self.functions.iter().find(|function| function.name == name)
    }

    pub fn to_lines(&self) -> Vec<String> {
        let mut out = vec![];
        for function in self.functions.iter() {
            out.push(format!("{}:", function.name));
            out.extend(function.instrs.iter().map(|instr| format!("  {}", instr)));
        }
        out
    }
}
