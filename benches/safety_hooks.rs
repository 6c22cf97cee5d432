use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lateral_gate::integrity::{FrameIntegrity, IntegrityConfig};
use lateral_gate::rulesets::{mqb, pq};
use lateral_gate::{CanFrame, RulesetConfig, SafetyHooks, SafetyModule};

fn hca_frame(torque: i32) -> CanFrame {
    let mut frame = CanFrame::from_bytes(1, mqb::MSG_HCA_01, [0; 8]);
    mqb::steering_command().torque.write(&mut frame, torque);
    frame
}

fn engaged_module(config: RulesetConfig) -> SafetyModule {
    let mut module = SafetyModule::new(config).unwrap();
    let acc = CanFrame::from_bytes(1, mqb::MSG_ACC_06, [0, 0, 0, 0, 0, 0, 0, 0x30]);
    module.on_frame_received(&acc);
    module
}

fn benchmark_rx(c: &mut Criterion) {
    let mut group = c.benchmark_group("rx");
    let mut eps = CanFrame::from_bytes(0, mqb::MSG_EPS_01, [0; 8]);
    mqb::ingress_layout().driver_torque.torque.write(&mut eps, -120);
    let unrelated = CanFrame::from_bytes(0, 0x3EB, [0x55; 8]);

    let mut module = engaged_module(mqb::mqb());
    group.bench_function("driver_torque", |b| {
        b.iter(|| module.on_frame_received(black_box(&eps)))
    });
    group.bench_function("unrelated", |b| {
        b.iter(|| module.on_frame_received(black_box(&unrelated)))
    });
    group.finish();
}

fn benchmark_tx(c: &mut Criterion) {
    let mut group = c.benchmark_group("tx");

    for (name, config) in [("mqb", mqb::mqb()), ("mqb-monitor", mqb::mqb_monitor())] {
        let mut module = engaged_module(config);
        let frames: Vec<CanFrame> = (0..32).map(|i| hca_frame(i * 5)).collect();
        group.bench_with_input(BenchmarkId::new("steering", name), &frames, |b, frames| {
            let mut now = 0u32;
            b.iter(|| {
                for frame in frames {
                    now = now.wrapping_add(10_000);
                    black_box(module.on_frame_about_to_send(black_box(frame), now));
                }
            })
        });
    }
    group.finish();
}

fn benchmark_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("route");
    let hca = hca_frame(0);

    for (name, config) in [("mqb", mqb::mqb()), ("pq", pq::pq_passthrough())] {
        let module = SafetyModule::new(config).unwrap();
        let extended = module.config().routing.extended_bus;
        group.bench_function(BenchmarkId::new("extended", name), |b| {
            b.iter(|| black_box(module.route_frame(black_box(extended), black_box(&hca))))
        });
    }
    group.finish();
}

fn benchmark_integrity(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrity");
    let mut sender = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
    let mut receiver = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
    let mut frame = CanFrame::from_bytes(1, mqb::MSG_ACC_06, [0, 0, 0x12, 0x34, 0x56, 0x78, 0x9A, 0x30]);

    group.bench_function("protect", |b| {
        b.iter(|| {
            let mut copy = frame;
            sender.protect(black_box(&mut copy))
        })
    });

    sender.protect(&mut frame);
    group.bench_function("check", |b| {
        b.iter(|| {
            receiver.reset();
            receiver.check(black_box(&frame))
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_rx,
    benchmark_tx,
    benchmark_route,
    benchmark_integrity
);
criterion_main!(benches);
