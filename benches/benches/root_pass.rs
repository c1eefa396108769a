// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_exit::{Component, Element, Exitable, Instance, View, completion};
use understory_exit_headless::{Headless, NodeId};

type Rows = Rc<RefCell<Vec<(Component<NodeId>, Instance<NodeId>)>>>;

/// A mounted list of `n` exitable rows whose exits settle immediately.
struct List {
    host: Rc<Headless>,
    ex: Exitable<Headless>,
    rows: Rows,
    exits: Rc<Cell<usize>>,
}

fn mount_list(n: usize) -> List {
    let host = Rc::new(Headless::new());
    let app = host.create_element("app");
    let ex = Exitable::new(Rc::clone(&host));
    let exits = Rc::new(Cell::new(0));
    let row = {
        let exits = Rc::clone(&exits);
        ex.component(Component::with_controller(
            move || {
                let exits = Rc::clone(&exits);
                Instance::builder()
                    .on_exit(move |_| {
                        exits.set(exits.get() + 1);
                        completion::ready()
                    })
                    .build()
            },
            |_| View::Element(Element::new("li").child("row")),
        ))
    };
    let rows: Rows = Rc::new(RefCell::new(
        (0..n).map(|_| (row.clone(), row.instantiate())).collect(),
    ));
    let list = {
        let rows = Rc::clone(&rows);
        Component::new(move |_| {
            let children = rows
                .borrow()
                .iter()
                .map(|(component, instance)| component.render(instance))
                .collect::<Vec<_>>();
            View::Element(Element::new("ul").children(children))
        })
    };
    ex.mount(&app, list);
    List {
        host,
        ex,
        rows,
        exits,
    }
}

fn bench_steady_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_pass");
    for &n in &[32usize, 256, 1024] {
        let list = mount_list(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("redraw_n{}", n), |b| {
            b.iter(|| {
                list.host.redraw();
                black_box(list.host.draw_count());
            })
        });
        assert_eq!(list.exits.get(), 0);
    }
    group.finish();
}

fn bench_exit_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("exit_batch");
    for &n in &[32usize, 256, 1024] {
        group.throughput(Throughput::Elements((n / 2) as u64));
        group.bench_function(format!("remove_half_and_settle_n{}", n), |b| {
            b.iter_batched(
                || mount_list(n),
                |list| {
                    list.rows.borrow_mut().truncate(n / 2);
                    list.host.redraw();
                    list.host.run_until_stalled();
                    black_box(list.ex.phase());
                    black_box(list.exits.get());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_replay_disabled(c: &mut Criterion) {
    let mut group = c.benchmark_group("exit_batch_no_replay");
    let n = 256;
    group.throughput(Throughput::Elements((n / 2) as u64));
    group.bench_function("remove_half_and_settle_n256", |b| {
        b.iter_batched(
            || {
                let list = mount_list(n);
                list.ex.set_replay(false);
                list
            },
            |list| {
                list.rows.borrow_mut().truncate(n / 2);
                list.host.redraw();
                list.host.run_until_stalled();
                black_box(list.exits.get());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_steady_pass,
    bench_exit_batch,
    bench_replay_disabled
);
criterion_main!(benches);
