use std::io;

use bfexec::{Bracket, Error, InstType, TAPE_LEN, Vm, VmError, compile, disassemble, execute};
use pretty_assertions::assert_eq;

fn output_of(code: &str, input: &[u8]) -> Vec<u8> {
    let mut output = Vec::new();
    execute(code, input, &mut output).unwrap();
    output
}

#[test]
fn copy_loop_writes_product() {
    assert_eq!(output_of("++++++[>++++++++++<-]>.", b""), vec![60]);
    let code = format!("{}[>{}<-]>.", "+".repeat(16), "+".repeat(17));
    assert_eq!(output_of(&code, b""), vec![(16 * 17 % 256) as u8]);
}

#[test]
fn clear_loop_terminates() {
    let prog = compile("+[-]").unwrap();
    assert!(prog.iter().all(|inst| !inst.is_jump()));
    let mut vm = Vm::new(&prog, io::empty(), io::sink());
    vm.run().unwrap();
    assert_eq!(vm.tape()[0], 0);
}

#[test]
fn echo_one_byte() {
    assert_eq!(output_of(",.", &[65]), vec![65]);
}

#[test]
fn exhausted_input_reads_zero() {
    assert_eq!(output_of(",.", b""), vec![0]);
}

#[test]
fn hello_world() {
    let code = "
        ++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]
        >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.
    ";
    assert_eq!(output_of(code, b""), b"Hello World!\n");
}

#[test]
fn cat_until_eof() {
    assert_eq!(output_of(",[.,]", b"brainfuck"), b"brainfuck");
}

#[test]
fn reverse_input() {
    // Store bytes to the right until EOF, then walk back printing them.
    assert_eq!(output_of(">,[>,]<[.<]", b"stressed"), b"desserts");
}

#[test]
fn mismatch_is_fatal() {
    let mut output = Vec::new();
    match execute("+[.", io::empty(), &mut output) {
        Err(Error::Compile(err)) => {
            assert_eq!(err.position, 1);
            assert_eq!(err.bracket, Bracket::Open);
        }
        other => panic!("expected a bracket mismatch, got {other:?}"),
    }
    assert!(output.is_empty());
}

#[test]
fn output_before_fault_is_delivered() {
    let mut output = Vec::new();
    let result = execute("+++.<", io::empty(), &mut output);
    assert!(matches!(result, Err(Error::Run(VmError::OutOfRange(_)))));
    assert_eq!(output, vec![3]);
}

#[test]
fn right_edge_of_tape() {
    let code = format!("{}+.>", ">".repeat(TAPE_LEN - 1));
    let prog = compile(&code).unwrap();
    let mut output = Vec::new();
    let mut vm = Vm::new(&prog, io::empty(), &mut output);
    match vm.run() {
        Err(VmError::OutOfRange(err)) => assert_eq!(err.target, TAPE_LEN as isize),
        other => panic!("expected out of range, got {other:?}"),
    }
    assert_eq!(vm.dp(), TAPE_LEN - 1);
    assert_eq!(vm.tape()[TAPE_LEN - 1], 1);
    drop(vm);
    assert_eq!(output, vec![1]);
}

#[test]
fn dump_listing() {
    let prog = compile("+++[>++<-]>[<]").unwrap();
    assert_eq!(prog[1].cmd, InstType::Multiply);
    assert_eq!(
        disassemble(&prog),
        "0  add 3\n1  mul [+1] 2\n2  clear\n3  move 1\n4  scan left\n"
    );
}

#[test]
fn program_runs_from_many_threads() {
    let prog = compile(",[>+<-]>.").unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0u8..4)
            .map(|n| {
                let prog = &prog;
                scope.spawn(move || {
                    let input = [n * 10];
                    let mut output = Vec::new();
                    Vm::new(prog, &input[..], &mut output).run().unwrap();
                    output
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), vec![n as u8 * 10]);
        }
    });
}
