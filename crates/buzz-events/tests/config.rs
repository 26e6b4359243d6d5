//! Building a bus from a `buzz-config` file.

#![cfg(feature = "config")]

use buzz_config::Config;
use buzz_events::{BusConfig, EventBus, Listener};

#[test]
fn bus_section_drives_bus_config() {
    let config = Config::from_toml_str(
        r#"
        [bus]
        name = "orders"
        catch_panics = false
        "#,
    )
    .unwrap();

    let bus = EventBus::with_config(BusConfig::from(&config.bus));

    assert_eq!(bus.config().name, "orders");
    assert!(!bus.config().catch_panics);
}

#[test]
fn default_config_catches_panics() {
    let config = Config::default();
    let bus = EventBus::with_config(BusConfig::from(&config.bus));
    fn explode(_: &u32) {
        panic!("caught");
    }
    bus.on("n", Listener::new(explode));

    assert!(bus.emit("n", 1_u32).is_ok());
}
