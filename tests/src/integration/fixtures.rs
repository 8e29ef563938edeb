//! Shared fixtures: a small robot model and a line-based parameter format.
//!
//! Every fixture component appends to an [`EventLog`] so tests can assert
//! on the order of creations, configurations, post-init hooks and
//! destructions.

use cf_01_config_tree::{for_each_parameter, paths, ParameterStore};
use cf_02_component_factory::{
    Component, ComponentContext, ConfigurationManager, FactoryConfig, FactoryError, FileFormats,
    LoadSaveError, ParameterProperties, ParametersLoaderSaver, ResourceChange, TypeRegistration,
    TypeRegistry, ROOT_COMPONENT_TYPE,
};
use parking_lot::Mutex;
use shared_types::ComponentId;
use std::io::{BufRead, Write};
use std::sync::Arc;

pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Entries of the log starting with `prefix`, in order.
pub fn events(log: &EventLog, prefix: &str) -> Vec<String> {
    log.lock()
        .iter()
        .filter(|e| e.starts_with(prefix))
        .cloned()
        .collect()
}

fn record(log: &EventLog, what: &str, path: &str) {
    log.lock().push(format!("{what}:{path}"));
}

// =============================================================================
// COMPONENT TYPES
// =============================================================================

/// Publishes its speed limit as the `speed_limit` resource.
pub struct Motor {
    pub path: String,
    pub max_speed: Mutex<u32>,
    log: EventLog,
}

impl Component for Motor {
    fn configure(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        let max_speed = ctx
            .value_or("max_speed", "100")
            .parse::<u32>()
            .map_err(|e| ctx.failure(format!("max_speed: {e}")))?;
        *self.max_speed.lock() = max_speed;
        ctx.declare_resource("speed_limit", Arc::new(max_speed));
        record(&self.log, "configure", ctx.path());
        Ok(())
    }

    fn post_configure_initialization(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        record(&self.log, "post", ctx.path());
        Ok(())
    }

    fn on_destroy(&self) {
        record(&self.log, "destroy", &self.path);
    }
}

/// Drives the motor named by its `motor` parameter and watches every
/// `speed_limit` resource.
pub struct Arm {
    pub path: String,
    pub motor: Mutex<Option<Arc<Motor>>>,
    pub changes: Mutex<Vec<(String, ComponentId, ResourceChange)>>,
    log: EventLog,
}

impl Component for Arm {
    fn configure(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        let motor = ctx.resolve_from_parameter::<Motor>("motor", true)?;
        *self.motor.lock() = Some(motor);
        ctx.request_notification("speed_limit", None);
        record(&self.log, "configure", ctx.path());
        Ok(())
    }

    fn post_configure_initialization(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        record(&self.log, "post", ctx.path());
        Ok(())
    }

    fn resource_changed(&self, name: &str, owner: ComponentId, change: ResourceChange) {
        self.changes.lock().push((name.to_string(), owner, change));
    }

    fn on_destroy(&self) {
        record(&self.log, "destroy", &self.path);
    }
}

/// Resolves every subgroup it has.
pub struct Robot {
    pub path: String,
    pub parts: Mutex<Vec<String>>,
    log: EventLog,
}

impl Component for Robot {
    fn configure(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        for name in ctx.sub_groups()? {
            ctx.resolve_dyn_subgroup(&name, true)?;
            self.parts.lock().push(name);
        }
        record(&self.log, "configure", ctx.path());
        Ok(())
    }

    fn post_configure_initialization(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        record(&self.log, "post", ctx.path());
        Ok(())
    }

    fn on_destroy(&self) {
        record(&self.log, "destroy", &self.path);
    }
}

/// Resolves the group named by `next` from `configure`, or from its
/// creator for the `EagerLink` registration. With `lazy = true` the
/// target is not configured.
pub struct Link {
    pub path: String,
    log: EventLog,
}

impl Component for Link {
    fn configure(&self, ctx: &ComponentContext) -> Result<(), FactoryError> {
        if ctx.value("next").is_ok() {
            let configure = ctx.value_or("lazy", "false") != "true";
            ctx.manager()
                .resolve_dyn_from_parameter(&paths::join(ctx.path(), "next"), configure)?;
        }
        record(&self.log, "configure", ctx.path());
        Ok(())
    }

    fn on_destroy(&self) {
        record(&self.log, "destroy", &self.path);
    }
}

/// Reads everything it needs in its constructor.
pub struct Sensor {
    pub rate: u32,
    pub configured: Mutex<bool>,
}

impl Component for Sensor {
    fn configure(&self, _ctx: &ComponentContext) -> Result<(), FactoryError> {
        *self.configured.lock() = true;
        Ok(())
    }
}

// =============================================================================
// REGISTRY AND MANAGER
// =============================================================================

/// Registry with the robot model:
///
/// ```text
/// Component ── Actuator (abstract) ── Motor ── Measurable (interface)
///          ├── Arm
///          ├── Robot
///          ├── Link, EagerLink
///          └── Sensor (configures in constructor)
/// ```
pub fn robot_registry(log: &EventLog) -> Arc<TypeRegistry> {
    let registry = Arc::new(TypeRegistry::new());
    let register = |registration: TypeRegistration| {
        if let Err(e) = registry.register(registration) {
            panic!("fixture registration failed: {e}");
        }
    };

    register(TypeRegistration::abstract_type("Actuator").parent(ROOT_COMPONENT_TYPE));
    register(TypeRegistration::interface("Measurable"));

    let l = log.clone();
    register(
        TypeRegistration::concrete("Motor")
            .parents(&["Actuator", "Measurable"])
            .constructor(move |ctx| {
                record(&l, "create", ctx.path());
                Ok(Motor {
                    path: ctx.path().to_string(),
                    max_speed: Mutex::new(0),
                    log: l.clone(),
                })
            })
            .describe(|d| {
                d.help("Electric motor", "");
                d.describe_int("max_speed")
                    .default_value(100)
                    .limits(0, 1000)
                    .help("Speed limit in rpm", "");
            }),
    );

    let l = log.clone();
    register(
        TypeRegistration::concrete("Arm")
            .parent(ROOT_COMPONENT_TYPE)
            .constructor(move |ctx| {
                record(&l, "create", ctx.path());
                Ok(Arm {
                    path: ctx.path().to_string(),
                    motor: Mutex::new(None),
                    changes: Mutex::new(Vec::new()),
                    log: l.clone(),
                })
            })
            .describe(|d| {
                d.describe_component("motor", "Motor")
                    .props(ParameterProperties::mandatory());
            }),
    );

    let l = log.clone();
    register(
        TypeRegistration::concrete("Robot")
            .parent(ROOT_COMPONENT_TYPE)
            .constructor(move |ctx| {
                record(&l, "create", ctx.path());
                Ok(Robot {
                    path: ctx.path().to_string(),
                    parts: Mutex::new(Vec::new()),
                    log: l.clone(),
                })
            }),
    );

    let l = log.clone();
    register(
        TypeRegistration::concrete("Link")
            .parent(ROOT_COMPONENT_TYPE)
            .constructor(move |ctx| {
                record(&l, "create", ctx.path());
                Ok(Link {
                    path: ctx.path().to_string(),
                    log: l.clone(),
                })
            }),
    );

    let l = log.clone();
    register(
        TypeRegistration::concrete("EagerLink")
            .parent(ROOT_COMPONENT_TYPE)
            .constructor(move |ctx| {
                record(&l, "create", ctx.path());
                if ctx.value("next").is_ok() {
                    ctx.manager()
                        .resolve_dyn_from_parameter(&paths::join(ctx.path(), "next"), false)?;
                }
                Ok(Link {
                    path: ctx.path().to_string(),
                    log: l.clone(),
                })
            }),
    );

    register(
        TypeRegistration::concrete("Sensor")
            .parent(ROOT_COMPONENT_TYPE)
            .configures_in_constructor(true)
            .constructor(|ctx| {
                let rate = ctx
                    .value_or("rate", "10")
                    .parse::<u32>()
                    .map_err(|e| ctx.failure(format!("rate: {e}")))?;
                Ok(Sensor {
                    rate,
                    configured: Mutex::new(false),
                })
            }),
    );

    registry
}

/// File formats with [`LineFormat`] registered as `lines` (`.cfg`).
pub fn line_formats() -> Arc<FileFormats> {
    let formats = FileFormats::new();
    formats.register_format("lines", Arc::new(LineFormat), Some(".cfg"));
    Arc::new(formats)
}

pub fn robot_manager(log: &EventLog) -> ConfigurationManager {
    match ConfigurationManager::with_config(
        robot_registry(log),
        line_formats(),
        FactoryConfig::default(),
    ) {
        Ok(manager) => manager,
        Err(e) => panic!("default configuration rejected: {e}"),
    }
}

/// Create `path` with its `type` and the given parameters.
pub fn add_group(
    manager: &ConfigurationManager,
    path: &str,
    type_name: &str,
    params: &[(&str, &str)],
) {
    let result = manager.create_group(path).and_then(|()| {
        manager.set_value(&paths::join(path, "type"), type_name)?;
        params
            .iter()
            .try_for_each(|(name, value)| manager.set_value(&paths::join(path, name), value))
    });
    if let Err(e) = result {
        panic!("could not add group {path}: {e}");
    }
}

/// Two arms sharing the robot's motors:
///
/// ```text
/// robot (Robot)
/// ├── left  (Arm, motor = ../motors/m1)
/// ├── right (Arm, motor = /robot/motors/m2)
/// └── motors
///     ├── m1 (Motor, max_speed = 120)
///     └── m2 (Motor)
/// ```
pub fn build_robot(manager: &ConfigurationManager) {
    add_group(manager, "robot", "Robot", &[]);
    add_group(manager, "robot/left", "Arm", &[("motor", "../motors/m1")]);
    add_group(manager, "robot/right", "Arm", &[("motor", "/robot/motors/m2")]);
    add_group(manager, "robot/motors", "Robot", &[]);
    add_group(manager, "robot/motors/m1", "Motor", &[("max_speed", "120")]);
    add_group(manager, "robot/motors/m2", "Motor", &[]);
}

// =============================================================================
// LINE FORMAT
// =============================================================================

/// `group/name = value` per line. Blank lines and `#` comments are
/// skipped.
pub struct LineFormat;

impl ParametersLoaderSaver for LineFormat {
    fn load(&self, input: &mut dyn BufRead, store: &mut dyn ParameterStore) -> Result<(), LoadSaveError> {
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (path, value) = line.split_once('=').ok_or(LoadSaveError::Malformed {
                line: i + 1,
                reason: "expected `path = value`".into(),
            })?;
            let path = path.trim();
            let (group, _) = paths::separate_last_element(path);
            if !group.is_empty() {
                store.create_group(group)?;
            }
            store.set_value(path, value.trim())?;
        }
        Ok(())
    }

    fn save(&self, output: &mut dyn Write, store: &dyn ParameterStore) -> Result<(), LoadSaveError> {
        let mut lines = Vec::new();
        for_each_parameter(store, "", &mut |group: &str, name: &str, value: &str| {
            lines.push(format!("{} = {value}", paths::join(group, name)));
        })?;
        for line in lines {
            writeln!(output, "{line}")?;
        }
        Ok(())
    }
}
