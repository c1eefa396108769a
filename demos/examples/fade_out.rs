// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fade out.
//!
//! Dismiss a notification, keep it in the document while its row collapses, then let the
//! list catch up.
//!
//! Run:
//! - `cargo run -p understory_exit_demos --example fade_out`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Rect;
use understory_exit::completion::{self, ExitDone};
use understory_exit::{Component, Element, Exitable, Instance, Phase, View};
use understory_exit_headless::{Headless, NodeId};

/// Collapse animation for one row.
struct Collapse {
    node: NodeId,
    bounds: Rect,
    done: Option<ExitDone>,
}

type Running = Rc<RefCell<Vec<Collapse>>>;

fn notification(
    ex: &Exitable<Headless>,
    running: &Running,
    label: &'static str,
) -> Component<NodeId> {
    let running = Rc::clone(running);
    ex.component(Component::with_controller(
        move || {
            let running = Rc::clone(&running);
            Instance::builder()
                .on_exit(move |node| {
                    let (done, completion) = completion::channel();
                    running.borrow_mut().push(Collapse {
                        node,
                        bounds: Rect::new(0.0, 0.0, 320.0, 48.0),
                        done: Some(done),
                    });
                    completion
                })
                .build()
        },
        move |_| View::Element(Element::new("li").attr("class", "note").child(label)),
    ))
}

fn main() {
    let host = Rc::new(Headless::new());
    let app = host.create_element("app");
    let ex = Exitable::new(Rc::clone(&host));
    let running = Running::default();

    let notes: Rc<RefCell<Vec<(Component<NodeId>, Instance<NodeId>)>>> = Rc::new(RefCell::new(
        ["saved", "synced", "uploaded"]
            .into_iter()
            .map(|label| {
                let component = notification(&ex, &running, label);
                let instance = component.instantiate();
                (component, instance)
            })
            .collect(),
    ));

    let list = {
        let notes = Rc::clone(&notes);
        Component::new(move |_| {
            let rows = notes
                .borrow()
                .iter()
                .map(|(component, instance)| component.render(instance))
                .collect::<Vec<_>>();
            View::Element(Element::new("ul").children(rows))
        })
    };
    ex.mount(&app, list);
    println!("mounted:   {}", host.document().outline(app));

    // Dismiss the middle notification.
    notes.borrow_mut().remove(1);
    host.redraw();
    println!("dismissed: {}", host.document().outline(app));
    assert_eq!(ex.phase(), Phase::Suspended);

    let mut frame = 0;
    while !running.borrow().is_empty() {
        frame += 1;
        for collapse in running.borrow_mut().iter_mut() {
            let b = collapse.bounds;
            collapse.bounds = Rect::new(b.x0, b.y0, b.x1, (b.y1 - 12.0).max(b.y0));
            host.set_attr(
                collapse.node,
                "style",
                &format!("height: {}px", collapse.bounds.height()),
            );
            println!(
                "frame {frame}: node {} height {}",
                collapse.node.index(),
                collapse.bounds.height()
            );
            if collapse.bounds.height() <= 0.0
                && let Some(done) = collapse.done.take()
            {
                done.finish();
            }
        }
        running.borrow_mut().retain(|c| c.done.is_some());
        host.run_until_stalled();
    }

    println!("settled:   {}", host.document().outline(app));
    assert_eq!(ex.phase(), Phase::Normal);
    assert_eq!(host.document().children(host.document().children(app)[0]).len(), 2);
}
