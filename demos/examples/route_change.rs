// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route change.
//!
//! Navigate away from a page whose banner slides out first: each frame moves the live
//! banner element along a `kurbo` path. Redraws requested while the banner is leaving are
//! held and flushed once it is gone.
//!
//! Run:
//! - `cargo run -p understory_exit_demos --example route_change`

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;
use understory_exit::completion::{self, ExitDone};
use understory_exit::{Component, Element, Exitable, Instance, Phase, Routes, View};
use understory_exit_headless::{Headless, NodeId};

fn main() {
    let host = Rc::new(Headless::new());
    let app = host.create_element("app");
    let ex = Exitable::new(Rc::clone(&host));
    let leaving: Rc<RefCell<Option<(NodeId, ExitDone)>>> = Rc::default();

    let banner = {
        let leaving = Rc::clone(&leaving);
        ex.component(Component::with_controller(
            move || {
                let leaving = Rc::clone(&leaving);
                Instance::builder()
                    .on_exit(move |node| {
                        let (done, completion) = completion::channel();
                        *leaving.borrow_mut() = Some((node, done));
                        completion
                    })
                    .build()
            },
            |_| View::Element(Element::new("aside").child("welcome back")),
        ))
    };
    let banner_instance = banner.instantiate();

    let mut routes: Routes<NodeId> = Routes::new();
    routes.insert(
        "/".to_owned(),
        Component::new(move |_| {
            View::Element(
                Element::new("main")
                    .child(banner.render(&banner_instance))
                    .child(Element::new("h1").child("home")),
            )
        }),
    );
    routes.insert(
        "/settings".to_owned(),
        Component::new(|_| {
            View::Element(Element::new("main").child(Element::new("h1").child("settings")))
        }),
    );
    ex.route(&app, "/", routes);
    println!("{:?}: {}", ex.current_route(), host.document().outline(app));

    ex.navigate("/settings");
    println!("{:?}: {}", ex.current_route(), host.document().outline(app));
    assert_eq!(ex.phase(), Phase::Suspended);

    // Held while the banner is on its way out.
    host.redraw();
    assert!(host.has_pending_redraw());

    let (node, done) = leaving.borrow_mut().take().expect("banner exit started");
    let from = Point::new(0.0, 0.0);
    let to = Point::new(-320.0, 0.0);
    // Slide the live banner element; the document keeps it while the root is retained.
    for step in 1..=4 {
        let at = from.lerp(to, f64::from(step) / 4.0);
        host.set_attr(node, "style", &format!("transform: translate({}px, {}px)", at.x, at.y));
        println!(
            "banner node {}: {}",
            node.index(),
            host.document().attr(node, "style").unwrap_or_default()
        );
    }
    assert!(host.document().is_live(node));
    assert_eq!(
        host.document().attr(node, "style"),
        Some("transform: translate(-320px, 0px)")
    );
    done.finish();
    host.run_until_stalled();

    println!("{:?}: {}", ex.current_route(), host.document().outline(app));
    assert_eq!(ex.phase(), Phase::Normal);
    assert!(!host.has_pending_redraw());
    assert!(!host.document().is_live(node));
}
