use intcode_vm::{Opcode, Program, RunResult, VMState, VmConfig, VmError, VM};
use pretty_assertions::assert_eq;

const QUINE: [i64; 16] = [109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99];

// Reads a number, prints 999 / 1000 / 1001 for below / equal / above 8
const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,\
999,1105,1,46,1101,1000,1,20,4,20,1105,1,46,98,99";

fn complete(cells: &[i64], inputs: &[i64]) -> Vec<i64> {
    let mut vm = VM::new(&Program::from(cells), None);
    vm.feed_inputs(inputs.iter().copied());
    vm.run_to_completion(None).unwrap()
}

#[test]
fn test_quine_outputs_itself() {
    assert_eq!(complete(&QUINE, &[]), QUINE.to_vec());
}

#[test]
fn test_large_multiplication() {
    let outputs = complete(&[1102, 34915192, 34915192, 7, 4, 7, 99, 0], &[]);
    assert_eq!(outputs, vec![34915192 * 34915192]);
    assert_eq!(outputs[0].to_string().len(), 16);
}

#[test]
fn test_large_immediate_output() {
    assert_eq!(complete(&[104, 1125899906842624, 99], &[]), vec![1125899906842624]);
}

#[test]
fn test_compare_to_eight() {
    let program: Program = COMPARE_TO_EIGHT.parse().unwrap();
    for (input, expected) in [(5, 999), (8, 1000), (11, 1001)] {
        let mut vm = VM::new(&program, None);
        vm.feed_input(input);
        assert_eq!(vm.run_to_completion(None).unwrap(), vec![expected]);
    }
}

#[test]
fn test_relative_base_round_trip() {
    for (base, offset) in [(0, 50), (100, 7), (2_000, -3), (37, 0)] {
        // base += b; [rb+k] = input; output [b+k]
        let absolute = base + offset;
        let cells = vec![109, base, 203, offset, 4, absolute, 99];
        let mut vm = VM::new(&Program::new(cells), None);
        vm.feed_input(4242);
        assert_eq!(vm.run_to_completion(None).unwrap(), vec![4242]);
        assert_eq!(vm.read_memory(absolute as usize), 4242);
    }
}

#[test]
fn test_output_suspends_and_resumes() {
    let mut vm = VM::new(&Program::new(QUINE.to_vec()), Some(4));

    let first = vm.run(None).unwrap();
    assert_eq!(
        first,
        RunResult { output: Some(109), opcode: Some(Opcode::Output), address: Some(4) }
    );
    let second = vm.run(None).unwrap();
    assert_eq!(second.output, Some(1));
    assert_eq!(vm.take_output(), vec![109, 1]);
}

#[test]
fn test_run_without_suspend_goes_to_stop() {
    let config = VmConfig::default().with_suspend_on_output(false);
    let mut vm = VM::with_config(&Program::new(QUINE.to_vec()), None, config);

    let result = vm.run(None).unwrap();
    assert!(result.is_halted());
    assert_eq!(result.output, Some(99));
    assert_eq!(vm.take_output(), QUINE.to_vec());
}

#[test]
fn test_halt_is_idempotent() {
    let mut vm = VM::new(&Program::new(vec![104, 5, 99]), None);
    vm.run_to_completion(None).unwrap();
    let ip = vm.ip();
    assert_eq!(ip, 3);

    for _ in 0..3 {
        let result = vm.run(None).unwrap();
        assert!(result.is_halted());
        assert_eq!(result.output, Some(5));
        assert_eq!(vm.ip(), ip);
        assert!(vm.take_output().is_empty());
    }
}

#[test]
fn test_instances_are_isolated() {
    // Writes its address into cell 20, then outputs it
    let program = Program::new(vec![3, 20, 4, 20, 99]);
    let mut a = VM::new(&program, Some(1));
    let mut b = VM::new(&program, Some(2));

    a.run_to_completion(None).unwrap();
    assert_eq!(a.read_memory(20), 1);
    assert_eq!(b.read_memory(20), 0);

    b.run_to_completion(None).unwrap();
    assert_eq!(a.read_memory(20), 1);
    assert_eq!(b.read_memory(20), 2);
    assert_eq!(program.cells(), &[3, 20, 4, 20, 99]);
}

#[test]
fn test_runs_are_deterministic() {
    let program: Program = COMPARE_TO_EIGHT.parse().unwrap();
    let mut first = VM::new(&program, None);
    let mut second = VM::new(&program, None);
    first.feed_input(8);
    second.feed_input(8);

    assert_eq!(
        first.run_to_completion(None).unwrap(),
        second.run_to_completion(None).unwrap()
    );
    assert_eq!(first.memory().as_slice(), second.memory().as_slice());
}

#[test]
fn test_starved_input_is_recoverable() {
    let mut vm = VM::new(&Program::new(vec![3, 10, 4, 10, 99]), None);

    assert_eq!(vm.run(None), Err(VmError::InputStarved { ip: 0 }));
    assert_eq!(vm.state(), &VMState::Running);
    assert_eq!(vm.ip(), 0);

    vm.feed_input(12);
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![12]);
}

#[test]
fn test_decode_errors_abort_the_instance() {
    let mut vm = VM::new(&Program::new(vec![104, 1, 42, 99]), None);
    assert_eq!(vm.run(None).unwrap().output, Some(1));

    let err = vm.run(None).unwrap_err();
    assert_eq!(err, VmError::InvalidOpcode { ip: 2, value: 42 });
    assert!(!err.is_recoverable());

    // Aborted instances keep reporting the same failure
    assert_eq!(vm.run(None), Err(err.clone()));
    assert_eq!(vm.state(), &VMState::Aborted(err));
}

#[test]
fn test_immediate_destination_aborts() {
    let mut vm = VM::new(&Program::new(vec![11101, 1, 1, 5, 99]), None);
    assert_eq!(
        vm.run(None),
        Err(VmError::ImmediateDestination { ip: 0, opcode: Opcode::Add })
    );
}

#[test]
fn test_patch_then_run() {
    // noun/verb style patching of cells 1 and 2
    let program: Program = "1,0,0,0,99,5,6".parse().unwrap();
    let mut vm = VM::new(&program, None);
    vm.write_memory(1, 5).unwrap();
    vm.write_memory(2, 6).unwrap();
    vm.run(None).unwrap();
    assert_eq!(vm.read_memory(0), 11);

    vm.reset();
    assert_eq!(vm.read_memory(0), 1);
    vm.write_memory(2, 5).unwrap();
    vm.run(None).unwrap();
    assert_eq!(vm.read_memory(0), 6);
}

#[test]
fn test_seek_skips_code() {
    // Starting at 2 skips the first OUTPUT
    let mut vm = VM::new(&Program::new(vec![104, 1, 104, 2, 99]), None);
    vm.seek(2);
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![2]);
}

#[test]
fn test_seek_after_halt_resumes() {
    let mut vm = VM::new(&Program::new(vec![104, 1, 104, 2, 99]), None);
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![1, 2]);
    assert!(vm.is_halted());

    vm.seek(2);
    assert_eq!(vm.state(), &VMState::Running);
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![2]);
    assert!(vm.is_halted());
}

#[test]
fn test_seek_keeps_aborted_state() {
    let mut vm = VM::new(&Program::new(vec![104, 1, 42, 99]), None);
    vm.run(None).unwrap();
    let err = vm.run(None).unwrap_err();

    vm.seek(3);
    assert_eq!(vm.run(None), Err(err.clone()));
    assert_eq!(vm.state(), &VMState::Aborted(err));
}

#[test]
fn test_reset_redelivers_address() {
    let mut vm = VM::new(&Program::new(vec![3, 20, 4, 20, 99]), Some(5));
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![5]);
    assert!(vm.is_halted());

    vm.feed_input(9);
    vm.reset();
    assert_eq!(vm.pending_input(), 0);
    assert_eq!(vm.state(), &VMState::Running);
    assert_eq!(vm.read_memory(20), 0);
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![5]);
}

#[test]
fn test_reset_clears_abort() {
    let mut vm = VM::new(&Program::new(vec![104, 1, 42, 99]), None);
    vm.run(None).unwrap();
    assert!(vm.run(None).is_err());

    vm.reset();
    assert_eq!(vm.state(), &VMState::Running);
    assert_eq!(vm.last_output(), None);
    vm.write_memory(2, 99).unwrap();
    assert_eq!(vm.run_to_completion(None).unwrap(), vec![1]);
    assert!(vm.is_halted());
}

#[test]
fn test_ascii_round_trip() {
    // Echo three characters back
    let cells = vec![3, 20, 4, 20, 3, 20, 4, 20, 3, 20, 4, 20, 99];
    let config = VmConfig::default().with_ascii_mode(true);
    let mut vm = VM::with_config(&Program::new(cells), None, config);
    vm.feed_ascii("ok\n");

    while !vm.run(None).unwrap().is_halted() {}
    assert_eq!(vm.render_output(), "ok\n");
}

#[test]
fn test_output_events_carry_address() {
    let mut vm = VM::new(&Program::new(vec![104, 7, 99]), Some(9));
    vm.run_to_completion(None).unwrap();
    // run_to_completion drained the buffer
    assert!(vm.take_output_events().is_empty());

    vm.reset();
    vm.run(None).unwrap();
    let events = vm.take_output_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].address, Some(9));
    assert_eq!(events[0].value, 7);
}
