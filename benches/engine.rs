use criterion::{criterion_group, criterion_main, Criterion};
use numicell::{DualBudget, DualBudgetParams, NullReport, Pattern, Simulation};

fn bench_dual_budget(c: &mut Criterion) {
    c.bench_function("dual_budget_10k_steps", |b| {
        b.iter(|| {
            let sf = DualBudget::new(DualBudgetParams::default()).expect("params");
            let pattern = Pattern::new(vec![6, 5, 4, 3, 2, 1, 2, 3, 4, 5, 6]).expect("pattern");
            let mut sim =
                Simulation::new(Some(10_000), 2, pattern, sf, NullReport).expect("sim");
            sim.run().expect("run")
        })
    });
}

criterion_group!(benches, bench_dual_budget);
criterion_main!(benches);
