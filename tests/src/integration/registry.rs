//! # Type Registry
//!
//! Hierarchy queries and registration rules on the robot model, and the
//! type descriptions written by registration hooks.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cf_02_component_factory::{
        ComponentContext, ConfigurationManager, RegistryError, TypeRegistration, TypeRegistry,
        ROOT_COMPONENT_TYPE,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_hierarchy_queries() {
        let registry = robot_registry(&new_log());

        assert!(registry.is_descendant_of("Motor", "Actuator"));
        assert!(registry.is_descendant_of("Motor", "Measurable"));
        assert!(registry.is_descendant_of("Motor", ROOT_COMPONENT_TYPE));
        assert!(!registry.is_descendant_of("Arm", "Actuator"));
        assert!(registry.is_interface("Measurable").unwrap());

        let direct = registry
            .get_all_subclasses(ROOT_COMPONENT_TYPE, Some(1), false)
            .unwrap();
        assert!(direct.contains(&"Actuator".to_string()));
        assert!(!direct.contains(&"Motor".to_string()));

        let concrete = registry
            .get_all_subclasses(ROOT_COMPONENT_TYPE, None, true)
            .unwrap();
        assert!(concrete.contains(&"Motor".to_string()));
        assert!(!concrete.contains(&"Actuator".to_string()));
        // Motor is reachable twice but listed once.
        assert_eq!(concrete.iter().filter(|t| *t == "Motor").count(), 1);
    }

    #[test]
    fn test_registration_rules() {
        let registry = robot_registry(&new_log());

        assert!(matches!(
            registry.register(TypeRegistration::concrete("Gripper").parent("Hand")),
            Err(RegistryError::AncestorNotRegistered { .. })
        ));
        assert!(matches!(
            registry.register(TypeRegistration::concrete("Gauge").parent("Measurable")),
            Err(RegistryError::ComponentHasNoParentComponent { .. })
        ));
        assert!(matches!(
            registry.register(TypeRegistration::abstract_type("Motor").parent(ROOT_COMPONENT_TYPE)),
            Err(RegistryError::CannotReRegisterType { .. })
        ));
        // An identical registration is accepted.
        assert!(registry
            .register(TypeRegistration::abstract_type("Actuator").parent(ROOT_COMPONENT_TYPE))
            .is_ok());
    }

    #[test]
    fn test_constructor_configuration_needs_compatible_parents() {
        let registry = robot_registry(&new_log());
        registry
            .register(
                TypeRegistration::abstract_type("LateDevice")
                    .parent(ROOT_COMPONENT_TYPE)
                    .configures_in_constructor(false),
            )
            .unwrap();

        let err = registry
            .register(
                TypeRegistration::concrete("EarlyDevice")
                    .parent("LateDevice")
                    .configures_in_constructor(true)
                    .constructor(|_: &ComponentContext| Ok(Sensor {
                        rate: 1,
                        configured: parking_lot::Mutex::new(false),
                    })),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::IncompatibleConfigurationStrategies { ref ancestor, .. } if ancestor == "LateDevice"
        ));
    }

    #[test]
    fn test_late_registration_is_visible_to_running_manager() {
        let log = new_log();
        let manager = robot_manager(&log);
        add_group(&manager, "g", "Gadget", &[]);
        assert!(manager.resolve_dyn("g", true).is_err());

        manager
            .registry()
            .register(
                TypeRegistration::concrete("Gadget")
                    .parent(ROOT_COMPONENT_TYPE)
                    .constructor(|_| Ok(Sensor {
                        rate: 0,
                        configured: parking_lot::Mutex::new(false),
                    })),
            )
            .unwrap();
        assert!(manager.resolve::<Sensor>("g", true).is_ok());
    }

    #[test]
    fn test_registries_are_independent() {
        let a = Arc::new(TypeRegistry::new());
        let b = robot_registry(&new_log());
        assert!(!a.is_type_registered("Motor"));
        assert!(b.is_type_registered("Motor"));

        let manager = ConfigurationManager::new(a);
        add_group(&manager, "m", "Motor", &[]);
        assert!(manager.resolve_dyn("m", true).is_err());
    }

    #[test]
    fn test_descriptions() {
        let registry = robot_registry(&new_log());
        assert_eq!(
            registry.description_value("Motor/shortHelp").as_deref(),
            Some("Electric motor")
        );
        assert_eq!(
            registry
                .description_value("Motor/Parameters/max_speed/default")
                .as_deref(),
            Some("100")
        );
        assert_eq!(
            registry
                .description_value("Motor/Parameters/max_speed/upperBound")
                .as_deref(),
            Some("1000")
        );
        assert_eq!(
            registry
                .description_value("Arm/Parameters/motor/componentType")
                .as_deref(),
            Some("Motor")
        );
        assert_eq!(
            registry
                .description_value("Arm/Parameters/motor/isMandatory")
                .as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_dump_type_descriptions() {
        let registry = robot_registry(&new_log());
        let formats = line_formats();
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("types.cfg");

        assert!(registry.dump_type_descriptions(&formats, &file, None));
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.contains("Motor/Parameters/max_speed/default = 100"));

        assert!(!registry.dump_type_descriptions(&formats, dir.path().join("types.xml"), None));
    }
}
