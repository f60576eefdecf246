//! Unit tests for IR generation.
//!
//! Programs are checked first so the generator sees a decorated scope tree,
//! then the emitted instructions are compared in their tuple form. Programs
//! with control flow are also executed on a small register machine.

use std::collections::HashMap;

use crate::{
    ast::{
        ast::{FunctionDef, Program},
        expressions::{Expr, Location, Operator},
        statements::Stmt,
        types::{DataType, ScalarType},
    },
    checker::checker::check,
    errors::errors::LowerError,
    symbol_table::symbol_table::ScopeTree,
    Options,
};

use super::{
    compiler::{generate, RegisterAllocator},
    ir::{Instr, ProgramIR, Register},
};

fn lower(functions: Vec<FunctionDef>) -> Result<ProgramIR, LowerError> {
    let program = Program::new(functions);
    let options = Options::default();
    let checked = check(&program, &options).unwrap();
    generate(&program, &checked.scopes, &options)
}

fn lines(ir: &ProgramIR, function: &str) -> Vec<String> {
    ir.function(function)
        .unwrap()
        .instrs
        .iter()
        .map(Instr::to_string)
        .collect()
}

fn main_with(locals: &[(&str, DataType)], body: Vec<Stmt>) -> FunctionDef {
    locals
        .iter()
        .fold(FunctionDef::new("main"), |function, (name, ty)| function.local(name, *ty))
        .body(body)
}

fn less(left: Expr, right: Expr) -> Expr {
    Expr::logical(Operator::Less, left, right)
}

#[test]
fn test_allocator_counts_from_one() {
    let mut allocator = RegisterAllocator::new("R");

    assert_eq!(allocator.fresh(), Register("R1".to_string()));
    assert_eq!(allocator.fresh(), Register("R2".to_string()));
    assert_eq!(allocator.fresh_label_id(), 3);
    assert_eq!(allocator.fresh(), Register("R4".to_string()));
}

#[test]
fn test_allocator_rebinding_replaces_register() {
    let mut allocator = RegisterAllocator::new("T");
    let first = allocator.fresh();
    let second = allocator.fresh();

    allocator.bind("x", first);
    allocator.bind("x", second.clone());

    assert_eq!(allocator.lookup("x"), Some(&second));
    assert_eq!(allocator.lookup("y"), None);
    assert_eq!(second.to_string(), "T2");
}

#[test]
fn test_instruction_tuple_form() {
    let add = Instr::Arith {
        op: Operator::Plus,
        kind: ScalarType::Int,
        left: Register("R1".to_string()),
        right: Register("R2".to_string()),
        dst: Register("R3".to_string()),
    };
    let cmp = Instr::Cmp {
        op: Operator::LessEquals,
        kind: ScalarType::Float,
        left: Register("R1".to_string()),
        right: Register("R2".to_string()),
        dst: Register("R3".to_string()),
    };

    assert_eq!(add.to_string(), "('ADDI', 'R1', 'R2', 'R3')");
    assert_eq!(cmp.to_string(), "('CMPF', '<=', 'R1', 'R2', 'R3')");
    assert_eq!(
        Instr::PrintS("hi".to_string()).to_string(),
        "('PRINTS', '\"hi\"')"
    );
}

#[test]
fn test_write_uses_latest_register() {
    let ir = lower(vec![main_with(
        &[("x", DataType::int())],
        vec![Stmt::assign("x", Expr::Int(3)), Stmt::Write(Expr::var("x"))],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'x', 'R1')",
            "('MOVI', '3', 'R2')",
            "('STOREI', 'R2', 'x')",
            "('PRINTI', 'R2')",
        ]
    );
}

#[test]
fn test_parameters_then_locals_are_loaded_on_entry() {
    let ir = lower(vec![FunctionDef::new("main")
        .param("p", DataType::float())
        .local("a", DataType::int())
        .local("b", DataType::array(ScalarType::Int, 4))])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'p', 'R1')",
            "('LOADI', 'a', 'R2')",
            "('LOADI', 'b', 'R3')",
        ]
    );
}

#[test]
fn test_call_and_return() {
    let add = FunctionDef::new("add")
        .param("a", DataType::int())
        .param("b", DataType::int())
        .body(vec![Stmt::Return(Expr::binary(
            Operator::Plus,
            Expr::var("a"),
            Expr::var("b"),
        ))]);
    let main = main_with(
        &[("r", DataType::int())],
        vec![Stmt::assign(
            "r",
            Expr::call("add", vec![Expr::Int(1), Expr::Int(2)]),
        )],
    );

    let ir = lower(vec![add, main]).unwrap();

    assert_eq!(
        lines(&ir, "add"),
        vec![
            "('LOADI', 'a', 'R1')",
            "('LOADI', 'b', 'R2')",
            "('ADDI', 'R1', 'R2', 'R3')",
            "('RET', 'R3')",
        ]
    );
    // Register numbering restarts in every function.
    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'r', 'R1')",
            "('MOVI', '1', 'R2')",
            "('MOVI', '2', 'R3')",
            "('CALL', 'add', 'R2', 'R3', 'R4')",
            "('STOREI', 'R4', 'r')",
        ]
    );
}

#[test]
fn test_float_arithmetic_uses_float_opcodes() {
    let ir = lower(vec![main_with(
        &[("f", DataType::float())],
        vec![Stmt::assign(
            "f",
            Expr::binary(Operator::Star, Expr::var("f"), Expr::Float(2.0)),
        )],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'f', 'R1')",
            "('MOVF', '2.0', 'R2')",
            "('MULF', 'R1', 'R2', 'R3')",
            "('STOREI', 'R3', 'f')",
        ]
    );
}

#[test]
fn test_cast_converts_between_scalars() {
    let ir = lower(vec![main_with(
        &[("i", DataType::int()), ("f", DataType::float())],
        vec![
            Stmt::assign("f", Expr::cast(ScalarType::Float, Expr::var("i"))),
            Stmt::assign("i", Expr::cast(ScalarType::Int, Expr::var("i"))),
        ],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'i', 'R1')",
            "('LOADI', 'f', 'R2')",
            "('ITOF', 'R1', 'R3')",
            "('STOREI', 'R3', 'f')",
            "('STOREI', 'R1', 'i')",
        ]
    );
}

#[test]
fn test_negation_subtracts_from_zero() {
    let ir = lower(vec![main_with(
        &[("i", DataType::int())],
        vec![Stmt::assign("i", Expr::unary(Operator::Minus, Expr::var("i")))],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'i', 'R1')",
            "('MOVI', '0', 'R2')",
            "('SUBI', 'R2', 'R1', 'R3')",
            "('STOREI', 'R3', 'i')",
        ]
    );
}

#[test]
fn test_array_element_store_and_load() {
    let ir = lower(vec![main_with(
        &[("a", DataType::array(ScalarType::Int, 4))],
        vec![
            Stmt::assign_index("a", Expr::Int(1), Expr::Int(7)),
            Stmt::Write(Expr::index("a", Expr::Int(1))),
        ],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'a', 'R1')",
            "('MOVI', '1', 'R2')",
            "('MOVI', '7', 'R3')",
            "('STOREA', 'R3', 'a', 'R2')",
            "('MOVI', '1', 'R4')",
            "('LOADA', 'a', 'R4', 'R5')",
            "('PRINTI', 'R5')",
        ]
    );
}

#[test]
fn test_read_rebinds_name() {
    let ir = lower(vec![main_with(
        &[("x", DataType::float())],
        vec![
            Stmt::Read(Location::Simple("x".to_string())),
            Stmt::Write(Expr::var("x")),
        ],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'x', 'R1')",
            "('READF', 'R2')",
            "('STOREI', 'R2', 'x')",
            "('PRINTF', 'R2')",
        ]
    );
}

#[test]
fn test_if_else_labels() {
    let ir = lower(vec![main_with(
        &[("i", DataType::int())],
        vec![Stmt::if_else(
            Expr::logical(Operator::Equals, Expr::var("i"), Expr::Int(0)),
            Stmt::Write(Expr::var("i")),
            Stmt::Skip,
        )],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'i', 'R1')",
            "('MOVI', '0', 'R3')",
            "('CMPI', '==', 'R1', 'R3', 'R4')",
            "('CBRANCH', 'R4', 'then2', 'else2')",
            "('LABEL', 'then2')",
            "('PRINTI', 'R1')",
            "('BRANCH', 'endif2')",
            "('LABEL', 'else2')",
            "('LABEL', 'endif2')",
        ]
    );
}

#[test]
fn test_if_without_else_falls_through_to_end() {
    let ir = lower(vec![main_with(
        &[("i", DataType::int())],
        vec![Stmt::if_then(
            less(Expr::var("i"), Expr::Int(1)),
            Stmt::Print("small".to_string()),
        )],
    )])
    .unwrap();

    let instrs = &ir.function("main").unwrap().instrs;
    assert!(instrs.contains(&Instr::CBranch {
        cond: Register("R4".to_string()),
        on_true: "then2".to_string(),
        on_false: "endif2".to_string(),
    }));
    assert!(!instrs.iter().any(|instr| matches!(instr, Instr::Branch(_))));
}

#[test]
fn test_nested_break_targets_own_loop() {
    let inner = Stmt::while_loop(less(Expr::var("i"), Expr::Int(5)), Stmt::Break);
    let outer = Stmt::while_loop(
        less(Expr::var("i"), Expr::Int(10)),
        Stmt::Block(vec![inner, Stmt::Break]),
    );

    let ir = lower(vec![main_with(&[("i", DataType::int())], vec![outer])]).unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'i', 'R1')",
            "('LABEL', 'while2')",
            "('MOVI', '10', 'R3')",
            "('CMPI', '<', 'R1', 'R3', 'R4')",
            "('CBRANCH', 'R4', 'whilebody2', 'endwhile2')",
            "('LABEL', 'whilebody2')",
            "('LABEL', 'while5')",
            "('MOVI', '5', 'R6')",
            "('CMPI', '<', 'R1', 'R6', 'R7')",
            "('CBRANCH', 'R7', 'whilebody5', 'endwhile5')",
            "('LABEL', 'whilebody5')",
            "('BRANCH', 'endwhile5')",
            "('BRANCH', 'while5')",
            "('LABEL', 'endwhile5')",
            "('BRANCH', 'endwhile2')",
            "('BRANCH', 'while2')",
            "('LABEL', 'endwhile2')",
        ]
    );
}

#[test]
fn test_break_outside_loop_is_a_lowering_error() {
    let result = lower(vec![main_with(&[], vec![Stmt::Break])]);

    assert_eq!(
        result,
        Err(LowerError::BreakOutsideLoop {
            function: "main".to_string()
        })
    );
}

#[test]
fn test_unchecked_function_has_no_scope() {
    let program = Program::new(vec![FunctionDef::new("main")]);
    let scopes = ScopeTree::new();

    let result = generate(&program, &scopes, &Options::default());

    assert_eq!(
        result,
        Err(LowerError::MissingScope {
            name: "main".to_string()
        })
    );
}

#[test]
fn test_program_listing() {
    let ir = lower(vec![main_with(&[], vec![Stmt::Print("hello".to_string())])]).unwrap();

    assert_eq!(
        ir.to_lines(),
        vec!["main:".to_string(), "  ('PRINTS', '\"hello\"')".to_string()]
    );
}

#[test]
fn test_unary_plus_passes_operand_through() {
    let ir = lower(vec![main_with(
        &[("i", DataType::int())],
        vec![Stmt::Write(Expr::unary(Operator::Plus, Expr::var("i")))],
    )])
    .unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec!["('LOADI', 'i', 'R1')", "('PRINTI', 'R1')"]
    );
}

#[test]
fn test_unary_operator_without_lowering_is_an_error() {
    let result = lower(vec![main_with(
        &[("i", DataType::int())],
        vec![Stmt::Write(Expr::unary(Operator::Star, Expr::var("i")))],
    )]);

    assert_eq!(
        result,
        Err(LowerError::UnsupportedOperator {
            operator: "*".to_string()
        })
    );
}

/// Executes integer IR: one value per register, one per named slot.
struct Machine<'a> {
    ir: &'a ProgramIR,
    parameters: HashMap<String, Vec<String>>,
    output: Vec<i64>,
    steps: usize,
}

fn value(registers: &HashMap<String, i64>, register: &Register) -> i64 {
    *registers
        .get(&register.0)
        .unwrap_or_else(|| panic!("{} read before it was written", register))
}

fn arith(op: Operator, left: i64, right: i64) -> i64 {
    match op {
        Operator::Plus => left + right,
        Operator::Minus => left - right,
        Operator::Star => left * right,
        Operator::Slash => left / right,
        other => panic!("{} is not arithmetic", other),
    }
}

fn compare(op: Operator, left: i64, right: i64) -> bool {
    match op {
        Operator::Less => left < right,
        Operator::LessEquals => left <= right,
        Operator::Greater => left > right,
        Operator::GreaterEquals => left >= right,
        Operator::Equals => left == right,
        Operator::NotEquals => left != right,
        other => panic!("{} is not relational", other),
    }
}

impl<'a> Machine<'a> {
    fn new(ir: &'a ProgramIR, program: &Program) -> Self {
        let parameters = program
            .functions
            .iter()
            .map(|function| {
                let names = function.parameters.iter().map(|p| p.name.clone()).collect();
                (function.name.clone(), names)
            })
            .collect();

        Machine {
            ir,
            parameters,
            output: vec![],
            steps: 0,
        }
    }

    fn call(&mut self, name: &str, args: Vec<i64>) -> Option<i64> {
        let ir = self.ir;
        let instrs = &ir.function(name).unwrap().instrs;
        let labels: HashMap<&str, usize> = instrs
            .iter()
            .enumerate()
            .filter_map(|(at, instr)| match instr {
                Instr::Label(label) => Some((label.as_str(), at)),
                _ => None,
            })
            .collect();

        let mut slots: HashMap<String, i64> =
            self.parameters[name].iter().cloned().zip(args).collect();
        let mut registers: HashMap<String, i64> = HashMap::new();
        let mut pc = 0;

        while pc < instrs.len() {
            self.steps += 1;
            assert!(self.steps < 10_000, "{} does not terminate", name);

            match &instrs[pc] {
                Instr::LoadI { name, dst } => {
                    registers.insert(dst.0.clone(), slots.get(name).copied().unwrap_or(0));
                }
                Instr::MovI { value, dst } => {
                    registers.insert(dst.0.clone(), *value);
                }
                Instr::Arith { op, left, right, dst, .. } => {
                    let result = arith(*op, value(&registers, left), value(&registers, right));
                    registers.insert(dst.0.clone(), result);
                }
                Instr::Cmp { op, left, right, dst, .. } => {
                    let result = compare(*op, value(&registers, left), value(&registers, right));
                    registers.insert(dst.0.clone(), result as i64);
                }
                Instr::And { left, right, dst } => {
                    let result = value(&registers, left) != 0 && value(&registers, right) != 0;
                    registers.insert(dst.0.clone(), result as i64);
                }
                Instr::Or { left, right, dst } => {
                    let result = value(&registers, left) != 0 || value(&registers, right) != 0;
                    registers.insert(dst.0.clone(), result as i64);
                }
                Instr::Not { src, dst } => {
                    let result = value(&registers, src) == 0;
                    registers.insert(dst.0.clone(), result as i64);
                }
                Instr::StoreI { src, name } => {
                    slots.insert(name.clone(), value(&registers, src));
                }
                Instr::LoadA { name, index, dst } => {
                    let slot = format!("{}[{}]", name, value(&registers, index));
                    registers.insert(dst.0.clone(), slots.get(&slot).copied().unwrap_or(0));
                }
                Instr::StoreA { src, name, index } => {
                    let slot = format!("{}[{}]", name, value(&registers, index));
                    slots.insert(slot, value(&registers, src));
                }
                Instr::Call { name, args, dst } => {
                    let args = args.iter().map(|arg| value(&registers, arg)).collect();
                    let result = self.call(name, args).unwrap_or(0);
                    registers.insert(dst.0.clone(), result);
                }
                Instr::Ret { src } => return Some(value(&registers, src)),
                Instr::Label(_) | Instr::PrintS(_) => {}
                Instr::Branch(label) => {
                    pc = labels[label.as_str()];
                    continue;
                }
                Instr::CBranch { cond, on_true, on_false } => {
                    let target = if value(&registers, cond) != 0 { on_true } else { on_false };
                    pc = labels[target.as_str()];
                    continue;
                }
                Instr::Print { src, .. } => self.output.push(value(&registers, src)),
                other => panic!("{} is not supported by the test machine", other),
            }
            pc += 1;
        }

        None
    }
}

/// Checks, lowers and runs `main`, returning everything it wrote.
fn execute(functions: Vec<FunctionDef>) -> Vec<i64> {
    let program = Program::new(functions);
    let options = Options::default();
    let checked = check(&program, &options).unwrap();
    assert!(checked.is_ok(), "{:?}", checked.diagnostics);

    let ir = generate(&program, &checked.scopes, &options).unwrap();
    let mut machine = Machine::new(&ir, &program);
    machine.call("main", vec![]);
    machine.output
}

fn add(name: &str, amount: i64) -> Expr {
    Expr::binary(Operator::Plus, Expr::var(name), Expr::Int(amount))
}

fn counting_loop() -> FunctionDef {
    main_with(
        &[("i", DataType::int())],
        vec![
            Stmt::assign("i", Expr::Int(0)),
            Stmt::while_loop(less(Expr::var("i"), Expr::Int(3)), Stmt::assign("i", add("i", 1))),
            Stmt::Write(Expr::var("i")),
        ],
    )
}

#[test]
fn test_loop_head_reloads_written_names() {
    let ir = lower(vec![counting_loop()]).unwrap();

    assert_eq!(
        lines(&ir, "main"),
        vec![
            "('LOADI', 'i', 'R1')",
            "('MOVI', '0', 'R2')",
            "('STOREI', 'R2', 'i')",
            "('LABEL', 'while3')",
            "('LOADI', 'i', 'R4')",
            "('MOVI', '3', 'R5')",
            "('CMPI', '<', 'R4', 'R5', 'R6')",
            "('CBRANCH', 'R6', 'whilebody3', 'endwhile3')",
            "('LABEL', 'whilebody3')",
            "('MOVI', '1', 'R7')",
            "('ADDI', 'R4', 'R7', 'R8')",
            "('STOREI', 'R8', 'i')",
            "('BRANCH', 'while3')",
            "('LABEL', 'endwhile3')",
            "('LOADI', 'i', 'R9')",
            "('PRINTI', 'R9')",
        ]
    );
}

#[test]
fn test_counting_loop_terminates() {
    assert_eq!(execute(vec![counting_loop()]), vec![3]);
}

#[test]
fn test_iterative_factorial_runs() {
    let fact = FunctionDef::new("fact")
        .param("n", DataType::int())
        .local("acc", DataType::int())
        .body(vec![
            Stmt::assign("acc", Expr::Int(1)),
            Stmt::while_loop(
                Expr::logical(Operator::Greater, Expr::var("n"), Expr::Int(1)),
                Stmt::Block(vec![
                    Stmt::assign(
                        "acc",
                        Expr::binary(Operator::Star, Expr::var("acc"), Expr::var("n")),
                    ),
                    Stmt::assign("n", add("n", -1)),
                ]),
            ),
            Stmt::Return(Expr::var("acc")),
        ]);
    let main = main_with(&[], vec![Stmt::Write(Expr::call("fact", vec![Expr::Int(5)]))]);

    assert_eq!(execute(vec![fact, main]), vec![120]);
}

#[test]
fn test_recursive_factorial_runs() {
    let fact = FunctionDef::new("fact")
        .param("n", DataType::int())
        .body(vec![Stmt::if_else(
            Expr::logical(Operator::Greater, Expr::var("n"), Expr::Int(1)),
            Stmt::Return(Expr::binary(
                Operator::Star,
                Expr::var("n"),
                Expr::call("fact", vec![add("n", -1)]),
            )),
            Stmt::Return(Expr::Int(1)),
        )]);
    let main = main_with(&[], vec![Stmt::Write(Expr::call("fact", vec![Expr::Int(5)]))]);

    assert_eq!(execute(vec![fact, main]), vec![120]);
}

#[test]
fn test_if_else_join_reads_either_branch() {
    let pick = FunctionDef::new("pick")
        .param("c", DataType::int())
        .local("x", DataType::int())
        .body(vec![
            Stmt::if_else(
                Expr::logical(Operator::Greater, Expr::var("c"), Expr::Int(0)),
                Stmt::assign("x", Expr::Int(1)),
                Stmt::assign("x", Expr::Int(2)),
            ),
            Stmt::Return(Expr::var("x")),
        ]);
    let main = main_with(
        &[],
        vec![
            Stmt::Write(Expr::call("pick", vec![Expr::Int(1)])),
            Stmt::Write(Expr::call("pick", vec![Expr::Int(0)])),
        ],
    );

    assert_eq!(execute(vec![pick, main]), vec![1, 2]);
}

#[test]
fn test_break_leaves_loop_with_current_value() {
    let body = Stmt::Block(vec![
        Stmt::assign("i", add("i", 1)),
        Stmt::if_then(
            Expr::logical(Operator::Equals, Expr::var("i"), Expr::Int(4)),
            Stmt::Break,
        ),
    ]);
    let main = main_with(
        &[("i", DataType::int())],
        vec![
            Stmt::assign("i", Expr::Int(0)),
            Stmt::while_loop(less(Expr::var("i"), Expr::Int(10)), body),
            Stmt::Write(Expr::var("i")),
        ],
    );

    assert_eq!(execute(vec![main]), vec![4]);
}

#[test]
fn test_nested_loops_accumulate() {
    let inner = Stmt::while_loop(
        less(Expr::var("j"), Expr::Int(2)),
        Stmt::Block(vec![Stmt::assign("s", add("s", 1)), Stmt::assign("j", add("j", 1))]),
    );
    let outer = Stmt::while_loop(
        less(Expr::var("i"), Expr::Int(3)),
        Stmt::Block(vec![
            Stmt::assign("j", Expr::Int(0)),
            inner,
            Stmt::assign("i", add("i", 1)),
        ]),
    );
    let main = main_with(
        &[("i", DataType::int()), ("j", DataType::int()), ("s", DataType::int())],
        vec![
            Stmt::assign("i", Expr::Int(0)),
            Stmt::assign("s", Expr::Int(0)),
            outer,
            Stmt::Write(Expr::var("s")),
        ],
    );

    assert_eq!(execute(vec![main]), vec![6]);
}
