#![cfg(feature = "derive")]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tawsil::prelude::*;

#[derive(Injectable)]
struct Alpha;

#[derive(Injectable)]
struct Beta {
    hits: AtomicU64,
}

#[derive(Injectable)]
struct Gamma {
    #[inject(id = "IBeta")]
    beta: Injected<Beta>,
    note: Option<String>,
    #[inject(id = "IAlpha")]
    alpha: Injected<Alpha>,
}

#[test]
fn derived_dependencies_follow_field_order() {
    assert!(Alpha::DEPENDENCIES.is_empty());
    assert_eq!(Beta::DEPENDENCIES, &[None]);
    assert_eq!(Gamma::DEPENDENCIES, &[Some("IBeta"), None, Some("IAlpha")]);
}

#[test]
fn derived_constructor_wires_positionally() {
    let container = Container::new();
    container.singleton::<Alpha>("IAlpha").unwrap();
    container.singleton::<Beta>("IBeta").unwrap();
    container.transient::<Gamma>("IGamma").unwrap();

    let gamma = container.get::<Gamma>("IGamma").unwrap();

    assert!(gamma.note.is_none());
    assert_eq!(gamma.beta.identifier().as_str(), "IBeta");
    assert_eq!(gamma.alpha.identifier().as_str(), "IAlpha");

    let beta = container.get::<Beta>("IBeta").unwrap();
    assert!(Arc::ptr_eq(&gamma.beta.get(), &beta));
    gamma.beta.get().hits.fetch_add(1, Ordering::SeqCst);
    assert_eq!(beta.hits.load(Ordering::SeqCst), 1);
}

#[derive(Injectable)]
struct Chicken {
    #[inject(id = "IEgg")]
    egg: Injected<Egg>,
    label: String,
}

#[derive(Injectable)]
struct Egg {
    #[inject(id = "IChicken")]
    chicken: Injected<Chicken>,
    #[inject(id = "IFarmer")]
    farmer: Option<Injected<Alpha>>,
}

#[test]
fn derived_cycle_resolves() {
    let container = Container::new();
    container.singleton::<Chicken>("IChicken").unwrap();
    container.singleton::<Egg>("IEgg").unwrap();
    container.singleton::<Alpha>("IFarmer").unwrap();

    let chicken = container.get::<Chicken>("IChicken").unwrap();
    let egg = container.get::<Egg>("IEgg").unwrap();

    assert!(chicken.label.is_empty());
    assert!(egg.farmer.is_some());
    assert!(Arc::ptr_eq(&chicken.egg.get(), &egg));
    assert!(Arc::ptr_eq(&egg.chicken.get(), &chicken));
    assert_eq!(egg.chicken.get().egg.get().chicken.get().label, chicken.label);
}

mod runtime {
    pub use tawsil::*;
}

#[derive(Injectable)]
#[injectable(crate = "crate::runtime")]
struct Relocated {
    #[inject(id = "IAlpha")]
    alpha: Injected<Alpha>,
}

#[test]
fn crate_path_can_be_overridden() {
    let container = Container::new();
    container.singleton::<Alpha>("IAlpha").unwrap();
    container.transient::<Relocated>("IRelocated").unwrap();

    let relocated = container.get::<Relocated>("IRelocated").unwrap();
    assert!(relocated.alpha.is_bound());
}

#[test]
fn hand_supplied_metadata_behaves_like_derived() {
    let container = Container::new();
    container.singleton::<Alpha>("IAlpha").unwrap();
    container.singleton::<Beta>("IBeta").unwrap();
    container
        .register_transient(
            Registration::new("IGamma")
                .dependencies([Some("IBeta"), None, Some("IAlpha")])
                .callable(|args| {
                    Ok(Gamma {
                        beta: args.inject(0)?,
                        note: Some("by hand".into()),
                        alpha: args.inject(2)?,
                    })
                }),
        )
        .unwrap();

    let gamma = container.get::<Gamma>("IGamma").unwrap();
    assert_eq!(gamma.note.as_deref(), Some("by hand"));
    assert!(gamma.alpha.is_bound());
}
