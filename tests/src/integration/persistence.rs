//! # Persistence
//!
//! Loading and saving parameters through registered file formats, and
//! what happens to live components when a file replaces the tree.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cf_02_component_factory::{LoadSaveError, TreeError};
    use std::io::Cursor;
    use tempfile::TempDir;

    const ROBOT_CFG: &str = "\
# two motors
motors/m1/type = Motor
motors/m1/max_speed = 250
motors/m2/type = Motor

arm/type = Arm
arm/motor = /motors/m1
";

    #[test]
    fn test_load_and_resolve() {
        let log = new_log();
        let manager = robot_manager(&log);
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("robot.cfg");
        std::fs::write(&file, ROBOT_CFG).unwrap();

        assert!(manager.load_parameters(&file, false, None));
        let arm = manager.resolve::<Arm>("arm", true).unwrap();
        assert_eq!(*arm.motor.lock().as_ref().unwrap().max_speed.lock(), 250);
    }

    #[test]
    fn test_save_then_load_into_fresh_manager() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("saved.cfg");

        assert!(manager.save_parameters(&file, None));
        let other = robot_manager(&log);
        assert!(other.load_parameters(&file, false, Some("lines")));

        assert_eq!(other.value("robot/left/motor").unwrap(), "../motors/m1");
        assert_eq!(other.value("robot/motors/m1/max_speed").unwrap(), "120");
        assert_eq!(
            other.groups_list("robot").unwrap(),
            manager.groups_list("robot").unwrap()
        );
        assert!(other.resolve::<Robot>("robot", true).is_ok());
    }

    #[test]
    fn test_load_without_keep_old_destroys_components() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        manager.resolve::<Robot>("robot", true).unwrap();

        let mut input = Cursor::new(ROBOT_CFG.as_bytes());
        manager.load_from_reader(&mut input, "lines", false).unwrap();
        assert_eq!(manager.live_component_count(), 0);
        assert!(!manager.group_exists("robot"));
        assert!(manager.group_exists("motors/m2"));
        assert_eq!(events(&log, "destroy:").len(), 6);
    }

    #[test]
    fn test_load_with_keep_old_merges() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        let robot = manager.resolve::<Robot>("robot", true).unwrap();

        let mut input = Cursor::new("robot/motors/m1/max_speed = 10\nextra/type = Sensor\n".as_bytes());
        manager.load_from_reader(&mut input, "lines", true).unwrap();

        assert_eq!(manager.value("robot/motors/m1/max_speed").unwrap(), "10");
        assert!(manager.group_exists("extra"));
        // Live objects survive; they only see new values when rebuilt.
        let again = manager.resolve::<Robot>("robot", true).unwrap();
        assert!(std::sync::Arc::ptr_eq(&robot, &again));
    }

    #[test]
    fn test_load_errors() {
        let log = new_log();
        let manager = robot_manager(&log);
        let dir = TempDir::new().unwrap();

        assert!(!manager.load_parameters(dir.path().join("missing.cfg"), true, None));
        assert!(matches!(
            manager.try_load_parameters(&dir.path().join("robot.ini"), true, None),
            Err(LoadSaveError::UnknownFormat { .. })
        ));

        let mut input = Cursor::new("motors/m1/type Motor\n".as_bytes());
        assert!(matches!(
            manager.load_from_reader(&mut input, "lines", true),
            Err(LoadSaveError::Malformed { line: 1, .. })
        ));

        let mut input = Cursor::new("a//b = 1\n".as_bytes());
        assert!(matches!(
            manager.load_from_reader(&mut input, "lines", true),
            Err(LoadSaveError::Tree(TreeError::InvalidPath { .. }))
        ));
    }

    #[test]
    fn test_unknown_format_keeps_the_tree() {
        let log = new_log();
        let manager = robot_manager(&log);
        build_robot(&manager);
        manager.resolve::<Robot>("robot", true).unwrap();

        let dir = TempDir::new().unwrap();
        assert!(!manager.load_parameters(dir.path().join("robot.yaml"), false, None));
        assert_eq!(manager.live_component_count(), 6);
        assert!(manager.group_exists("robot/motors"));
    }

    #[test]
    fn test_save_to_writer() {
        let log = new_log();
        let manager = robot_manager(&log);
        add_group(&manager, "m", "Motor", &[("max_speed", "5")]);

        let mut out = Vec::new();
        manager.save_to_writer(&mut out, "lines").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "m/max_speed = 5\nm/type = Motor\n"
        );
    }
}
