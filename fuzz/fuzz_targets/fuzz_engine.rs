#![no_main]

use libfuzzer_sys::fuzz_target;

use numicell::{EwmaDeltaQ, EwmaParams, NullReport, Pattern, Simulation, MAX_CELLS, MAX_TXQ};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let values: Vec<u32> = data.iter().map(|byte| u32::from(*byte) % 32).collect();
    let Ok(pattern) = Pattern::new(values) else {
        return;
    };
    let Ok(sf) = EwmaDeltaQ::new(EwmaParams {
        alpha: 0.1,
        overprovision: 1,
    }) else {
        return;
    };
    let Ok(mut sim) = Simulation::new(Some(512), 1, pattern, sf, NullReport) else {
        return;
    };

    while let Ok(Some(_)) = sim.step() {
        let frame = sim.frame();
        assert!(frame.allocated() <= MAX_CELLS);
        assert!(frame.used() <= frame.allocated());
        assert!(sim.txq() <= MAX_TXQ);
    }
});
