use once_cell::sync::Lazy;
use os::loader::parse_program;
use os::{Machine, MachineConfig};
use types::{Addr, Pid, Word};

const PRODUCT: &str = include_str!("../../../programs/product.txt");
const COUNTDOWN: &str = include_str!("../../../programs/countdown.txt");
const ROGUE: &str = include_str!("../../../programs/rogue.txt");

const ROGUE_WRITE: &str = "
load_const 12
move_to_mar
load_const 5
move_to_mbr
write_at_addr
exit
";

const BRANCH: &str = "
load_const 1
ifgo 4
load_const 50
exit
load_const 7
move_to_mbr
load_const 12
move_to_mar
write_at_addr
exit
";

#[derive(Debug)]
pub struct TestCase<'a> {
    pub name: &'a str,
    /// `(partition size, program text)` in spawn order.
    pub programs: Vec<(usize, &'a str)>,
    pub quantum: u64,
    pub expected_cycles: u64,
    pub expected_exited: Vec<Pid>,
    pub expected_evicted: Vec<Pid>,
    pub expected_new_holes: u64,
    pub expected_memory: Vec<(Addr, Word)>,
}

pub static TEST_CASES: Lazy<Vec<TestCase<'static>>> = Lazy::new(|| {
    vec![
        TestCase {
            name: "single multiply",
            programs: vec![(20, PRODUCT)],
            quantum: 10,
            expected_cycles: 9,
            expected_exited: vec![0],
            expected_evicted: vec![],
            expected_new_holes: 1,
            expected_memory: vec![(16, Word::data(30))],
        },
        TestCase {
            name: "countdown loop",
            programs: vec![(20, COUNTDOWN)],
            quantum: 10,
            expected_cycles: 20,
            expected_exited: vec![0],
            expected_evicted: vec![],
            expected_new_holes: 1,
            expected_memory: vec![(17, Word::data(99))],
        },
        TestCase {
            name: "branch skips dead code",
            programs: vec![(16, BRANCH)],
            quantum: 10,
            expected_cycles: 8,
            expected_exited: vec![0],
            expected_evicted: vec![],
            expected_new_holes: 1,
            expected_memory: vec![(12, Word::data(7))],
        },
        TestCase {
            name: "rogue read is evicted",
            programs: vec![(10, ROGUE)],
            quantum: 10,
            expected_cycles: 3,
            expected_exited: vec![],
            expected_evicted: vec![0],
            expected_new_holes: 1,
            expected_memory: vec![],
        },
        TestCase {
            name: "rogue write is dropped",
            programs: vec![(10, ROGUE_WRITE)],
            quantum: 10,
            expected_cycles: 5,
            expected_exited: vec![],
            expected_evicted: vec![0],
            expected_new_holes: 1,
            expected_memory: vec![(12, Word::default())],
        },
        TestCase {
            name: "two copies interleave",
            programs: vec![(20, PRODUCT), (20, PRODUCT)],
            quantum: 2,
            expected_cycles: 18,
            expected_exited: vec![0, 1],
            expected_evicted: vec![],
            expected_new_holes: 2,
            expected_memory: vec![(16, Word::data(30)), (36, Word::data(30))],
        },
        TestCase {
            name: "eviction does not stop the others",
            programs: vec![(20, PRODUCT), (20, COUNTDOWN), (10, ROGUE)],
            quantum: 10,
            expected_cycles: 32,
            expected_exited: vec![0, 1],
            expected_evicted: vec![2],
            expected_new_holes: 3,
            expected_memory: vec![(16, Word::data(30)), (37, Word::data(99))],
        },
    ]
});

#[test]
fn test_program_execution() {
    for case in TEST_CASES.iter() {
        println!("#### Running test case: {} ####", case.name);
        let config = MachineConfig {
            quantum: case.quantum,
            ..MachineConfig::default()
        };
        let mut machine = Machine::new(&config);
        for (size, text) in &case.programs {
            let image = parse_program(text).unwrap();
            machine.spawn(&image, *size).unwrap();
        }

        let report = machine.run(10_000);
        assert!(!report.stopped_by_limit, "{}", case.name);
        assert_eq!(report.cycles, case.expected_cycles, "{}: cycles", case.name);
        assert_eq!(report.exited, case.expected_exited, "{}: exited", case.name);
        assert_eq!(report.evicted(), case.expected_evicted.as_slice(), "{}: evicted", case.name);
        assert_eq!(report.new_hole_count, case.expected_new_holes, "{}: holes", case.name);
        for (addr, word) in &case.expected_memory {
            assert_eq!(machine.store.read(*addr), Some(*word), "{}: mem[{}]", case.name, addr);
        }
        // every partition is returned once nothing is left running
        assert_eq!(machine.mmu.free_words(), config.memory_size, "{}", case.name);
        assert!(machine.scheduler.is_empty());
    }
}

#[test]
fn test_final_registers_belong_to_last_process() {
    let mut machine = Machine::default();
    for (size, text) in [(20, PRODUCT), (20, COUNTDOWN), (10, ROGUE)] {
        machine.spawn(&parse_program(text).unwrap(), size).unwrap();
    }
    let report = machine.run(10_000);

    let regs = report.registers;
    assert_eq!((regs.base, regs.pc), (20, 11));
    assert_eq!((regs.ac, regs.mar, regs.mbr), (99, 17, 99));
    assert_eq!((regs.ir0, regs.ir1), (0, 0));
}

#[test]
fn test_cycle_limit_stops_endless_loop() {
    let mut machine = Machine::default();
    let spin = parse_program("load_const 1\nifgo 0\n").unwrap();
    machine.spawn(&spin, 4).unwrap();

    let report = machine.run(50);
    assert!(report.stopped_by_limit);
    assert_eq!(report.cycles, 50);
    assert!(report.exited.is_empty());
    assert_eq!(machine.cpu.regs.pc, 0);
}

#[test]
fn test_report_renders_probes() {
    let config = MachineConfig {
        probes: vec![16, 5000],
        ..MachineConfig::default()
    };
    let mut machine = Machine::new(&config);
    machine.spawn(&parse_program(PRODUCT).unwrap(), 20).unwrap();
    let report = machine.run(100);

    let text = report.to_string();
    assert!(text.contains("mem[16] = OP=30 ARG=0"));
    assert!(text.contains("mem[5000] = (out of bounds)"));
    assert!(text.contains("Exited: [0]"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["cycles"], 9);
    assert_eq!(json["faults"]["evicted"], serde_json::json!([]));
}
