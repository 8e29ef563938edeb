//! # Shared Managers
//!
//! Clones of one manager used from several threads. Each resolution pass
//! holds the manager's lock, so nested resolves from one thread never
//! interleave with another thread's pass.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use cf_02_component_factory::ConstructionStatus;
    use std::sync::{Arc, Barrier};
    use std::thread;

    const THREADS: usize = 8;

    #[test]
    fn test_chains_resolved_from_many_threads() {
        let log = new_log();
        let manager = robot_manager(&log);
        for i in 0..THREADS {
            let leaf = format!("leaf:{i}");
            let next = format!("/{leaf}");
            add_group(&manager, &format!("chain:{i}"), "Link", &[("next", next.as_str())]);
            add_group(&manager, &leaf, "Link", &[]);
        }

        let barrier = Arc::new(Barrier::new(THREADS));
        let workers: Vec<_> = (0..THREADS)
            .map(|i| {
                let manager = manager.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    manager.resolve::<Link>(&format!("chain:{i}"), true).map(|_| ())
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        assert_eq!(manager.live_component_count(), 2 * THREADS);
        for i in 0..THREADS {
            assert_eq!(
                manager.status(&format!("leaf:{i}")).unwrap(),
                ConstructionStatus::CreatedAndConfigured
            );
        }
        // Every pass finished as a unit: each leaf is configured right
        // before the chain that needed it.
        let configures = events(&log, "configure:");
        for pair in configures.chunks(2) {
            let leaf = pair[0].trim_start_matches("configure:leaf:");
            assert_eq!(pair[1], format!("configure:chain:{leaf}"));
        }
    }

    #[test]
    fn test_shared_group_is_built_once() {
        let log = new_log();
        let manager = robot_manager(&log);
        add_group(&manager, "motor", "Motor", &[]);

        let barrier = Arc::new(Barrier::new(THREADS));
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let manager = manager.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    manager.resolve::<Motor>("motor", true).ok()
                })
            })
            .collect();
        let motors: Vec<_> = workers
            .into_iter()
            .map(|w| w.join().unwrap().unwrap())
            .collect();

        assert!(motors.iter().all(|m| Arc::ptr_eq(m, &motors[0])));
        assert_eq!(events(&log, "create:"), vec!["create:motor"]);
    }
}
