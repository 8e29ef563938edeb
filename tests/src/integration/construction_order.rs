//! # Construction Order
//!
//! Creation, configuration and post-init ordering over a full object
//! graph, plus the lifetime rules around it: repeated resolution, tree
//! edits and destruction.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cf_02_component_factory::{ConstructionStatus, FactoryError};
    use std::sync::Arc;

    // =============================================================================
    // ORDERING
    // =============================================================================

    #[test]
    fn test_robot_graph_order() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);

        manager.resolve::<Robot>("robot", true).unwrap();

        assert_eq!(
            events(&log, "create:"),
            vec![
                "create:robot",
                "create:robot/left",
                "create:robot/motors/m1",
                "create:robot/motors",
                "create:robot/motors/m2",
                "create:robot/right",
            ]
        );
        let configured = vec![
            "configure:robot/motors/m1",
            "configure:robot/left",
            "configure:robot/motors/m2",
            "configure:robot/motors",
            "configure:robot/right",
            "configure:robot",
        ];
        assert_eq!(events(&log, "configure:"), configured);

        // Post-init mirrors the configure order, after all of it.
        let post: Vec<String> = configured
            .iter()
            .map(|e| e.replacen("configure:", "post:", 1))
            .collect();
        assert_eq!(events(&log, "post:"), post);
        let all = log.lock().clone();
        let first_post = all.iter().position(|e| e.starts_with("post:")).unwrap();
        assert!(all[first_post..].iter().all(|e| e.starts_with("post:")));
    }

    #[test]
    fn test_shared_dependency_is_one_object() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        add_group(&manager, "robot/spare", "Arm", &[("motor", "../motors/m2")]);

        manager.resolve::<Robot>("robot", true).unwrap();
        let right = manager.resolve::<Arm>("robot/right", true).unwrap();
        let spare = manager.resolve::<Arm>("robot/spare", true).unwrap();
        let m2 = manager.resolve::<Motor>("robot/motors/m2", true).unwrap();

        assert!(Arc::ptr_eq(right.motor.lock().as_ref().unwrap(), &m2));
        assert!(Arc::ptr_eq(spare.motor.lock().as_ref().unwrap(), &m2));
        assert_eq!(events(&log, "create:robot/motors/m2").len(), 1);
    }

    #[test]
    fn test_leaf_resolution_builds_only_what_it_needs() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);

        let left = manager.resolve::<Arm>("robot/left", true).unwrap();
        assert_eq!(*left.motor.lock().as_ref().unwrap().max_speed.lock(), 120);
        assert_eq!(manager.live_component_count(), 2);
        assert_eq!(
            manager.status("robot").unwrap(),
            ConstructionStatus::NotCreated
        );
    }

    #[test]
    fn test_constructor_configured_type() {
        let log = new_log();
        let manager = robot_manager(&log);
        add_group(&manager, "imu", "Sensor", &[("rate", "50")]);

        let imu = manager.resolve::<Sensor>("imu", true).unwrap();
        assert_eq!(imu.rate, 50);
        assert!(!*imu.configured.lock());
        assert_eq!(
            manager.status("imu").unwrap(),
            ConstructionStatus::CreatedAndConfigured
        );
    }

    #[test]
    fn test_bad_parameter_fails_and_can_be_fixed() {
        let log = new_log();
        let manager = robot_manager(&log);
        add_group(&manager, "m", "Motor", &[("max_speed", "fast")]);

        let err = manager.resolve::<Motor>("m", true).err().unwrap();
        assert!(matches!(err, FactoryError::ComponentFailure { ref path, .. } if path == "m"));
        assert_eq!(manager.status("m").unwrap(), ConstructionStatus::NotCreated);
        assert_eq!(events(&log, "destroy:"), vec!["destroy:m"]);

        manager.set_value("m/max_speed", "80").unwrap();
        let motor = manager.resolve::<Motor>("m", true).unwrap();
        assert_eq!(*motor.max_speed.lock(), 80);
    }

    // =============================================================================
    // LIFETIME
    // =============================================================================

    #[test]
    fn test_clear_all_destroys_parents_first() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        manager.resolve::<Robot>("robot", true).unwrap();

        manager.clear_all();
        assert_eq!(
            events(&log, "destroy:"),
            vec![
                "destroy:robot",
                "destroy:robot/left",
                "destroy:robot/motors",
                "destroy:robot/motors/m1",
                "destroy:robot/motors/m2",
                "destroy:robot/right",
            ]
        );
        assert_eq!(manager.live_component_count(), 0);
        assert!(manager.groups_list("").unwrap().is_empty());
    }

    #[test]
    fn test_copy_group_copies_parameters_not_objects() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        manager.resolve::<Robot>("robot", true).unwrap();

        manager.copy_group("robot", "twin").unwrap();
        assert_eq!(manager.status("twin").unwrap(), ConstructionStatus::NotCreated);
        assert_eq!(manager.value("twin/motors/m1/max_speed").unwrap(), "120");

        // The relative motor path now points into the copy.
        let twin_left = manager.resolve::<Arm>("twin/left", true).unwrap();
        let left = manager.resolve::<Arm>("robot/left", true).unwrap();
        assert!(!Arc::ptr_eq(
            twin_left.motor.lock().as_ref().unwrap(),
            left.motor.lock().as_ref().unwrap()
        ));
    }

    #[test]
    fn test_deep_copy_builds_a_separate_graph() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        let robot = manager.resolve::<Robot>("robot", true).unwrap();

        let copy = manager.create_deep_copy();
        let copied = copy.resolve::<Robot>("robot", true).unwrap();
        assert!(!Arc::ptr_eq(&robot, &copied));
        assert_eq!(manager.live_component_count(), 6);
        assert_eq!(copy.live_component_count(), 6);
    }
}
