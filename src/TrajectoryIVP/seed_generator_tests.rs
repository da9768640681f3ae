#[cfg(test)]
mod tests {
    use super::super::seed_generator::*;
    use super::super::seed_io::SeedArrays;
    use crate::TrajectoryBVP::physical_params::PhysicalParams;
    use crate::TrajectoryBVP::trajectory_error::TrajectoryError;
    use approx::assert_relative_eq;

    fn production_params() -> PhysicalParams {
        PhysicalParams {
            length: 230910.1,
            ..PhysicalParams::default()
        }
    }

    fn ballistic_params() -> PhysicalParams {
        PhysicalParams {
            thrust: 0.0,
            cd: 0.0,
            ..PhysicalParams::default()
        }
    }

    #[test]
    fn test_production_seed_reaches_ground() {
        let seed = SeedGenerator::new(production_params(), SeedConfig::default())
            .generate()
            .unwrap();
        assert_eq!(seed.n_events, 1);
        assert_eq!(seed.t[0], 0.0);
        assert_eq!(seed.y[0], 0.0);
        assert_eq!(seed.v[0], 100.0);
        // the thrust-dominated flight lands close to the production domain length
        assert_relative_eq!(seed.impact_range, 230910.1, max_relative = 5e-3);
        assert!(seed.impact_time > 30.0 && seed.impact_time < 40.0);
        assert_eq!(*seed.x.last().unwrap(), seed.impact_range);
        assert_eq!(*seed.t.last().unwrap(), seed.impact_time);
        assert!(seed.x.windows(2).all(|w| w[1] >= w[0]));
        assert!(seed.t.windows(2).all(|w| w[1] - w[0] <= 0.1 + 1e-12));
        let summary = seed.flight_summary();
        assert!(summary.apex_altitude > 1000.0 && summary.apex_altitude < 2000.0);
        assert!(summary.max_speed > 1000.0);
    }

    #[test]
    fn test_single_downward_crossing_for_various_angles() {
        for angle in [5.0, 20.0, 45.0, 60.0, 85.0] {
            let config = SeedConfig {
                launch_angle_deg: angle,
                ..SeedConfig::default()
            };
            let seed = SeedGenerator::new(production_params(), config)
                .generate()
                .unwrap_or_else(|e| panic!("angle {}: {}", angle, e));
            let n = seed.len();
            assert!(n > 2, "angle {}", angle);
            // every sample strictly between launch and impact is airborne
            for (i, y) in seed.y[1..n - 1].iter().enumerate() {
                assert!(*y > 0.0, "angle {}: y[{}] = {}", angle, i + 1, y);
            }
            assert!(seed.y[n - 1].abs() < 1e-3, "angle {}", angle);
            assert!(seed.impact_time < seed.t.len() as f64 * 0.1 + 1e-9);
        }
    }

    #[test]
    fn test_ballistic_flight_matches_analytic_projectile() {
        let config = SeedConfig {
            launch_angle_deg: 45.0,
            rtol: 1e-10,
            atol: 1e-10,
            ..SeedConfig::default()
        };
        let g = 9.81;
        let v0: f64 = 100.0;
        let angle = 45.0f64.to_radians();
        let seed = SeedGenerator::new(ballistic_params(), config)
            .generate()
            .unwrap();
        let range = v0 * v0 * (2.0 * angle).sin() / g;
        let time = 2.0 * v0 * angle.sin() / g;
        assert_relative_eq!(seed.impact_range, range, max_relative = 1e-6);
        assert_relative_eq!(seed.impact_time, time, max_relative = 1e-6);
        assert_relative_eq!(range, 1019.368, epsilon = 1e-3);
        let apex = seed.flight_summary().apex_altitude;
        assert_relative_eq!(apex, (v0 * angle.sin()).powi(2) / (2.0 * g), max_relative = 1e-3);
        // energy is conserved without thrust and drag
        let last = seed.len() - 1;
        assert_relative_eq!(seed.v[last], v0, max_relative = 1e-6);
    }

    #[test]
    fn test_short_horizon_is_a_termination_failure() {
        let config = SeedConfig {
            t_max: 1.0,
            ..SeedConfig::default()
        };
        let result = SeedGenerator::new(production_params(), config).generate();
        assert!(matches!(
            result,
            Err(TrajectoryError::SeedTermination { t_max }) if t_max == 1.0
        ));
    }

    #[test]
    fn test_config_validation() {
        let base = SeedConfig::default();
        assert!(base.validate().is_ok());
        for bad in [
            SeedConfig { launch_angle_deg: 0.0, ..base.clone() },
            SeedConfig { launch_angle_deg: 95.0, ..base.clone() },
            SeedConfig { v_launch: -1.0, ..base.clone() },
            SeedConfig { max_step: 0.0, ..base.clone() },
            SeedConfig { atol: 0.0, ..base.clone() },
            SeedConfig { t_max: f64::NAN, ..base.clone() },
            SeedConfig { min_event_time: 200.0, ..base.clone() },
        ] {
            assert!(matches!(
                SeedGenerator::new(production_params(), bad).generate(),
                Err(TrajectoryError::InvalidConfiguration(_))
            ));
        }
        let vertical = SeedConfig { launch_angle_deg: 90.0, ..base };
        assert!(vertical.validate().is_ok());
    }

    #[test]
    fn test_seed_arrays_follow_solution() {
        let seed = SeedGenerator::new(production_params(), SeedConfig::default())
            .generate()
            .unwrap();
        let arrays = SeedArrays::from(&seed);
        assert_eq!(arrays.len(), seed.len());
        assert!(arrays.validate().is_ok());
        assert_eq!(arrays.x, seed.x);
        assert_eq!(arrays.v, seed.v);
    }

    #[test]
    fn test_partial_config_json_keeps_defaults() {
        let config: SeedConfig =
            serde_json::from_str(r#"{"launch_angle_deg": 30.0, "t_max": 50.0}"#).unwrap();
        assert_eq!(config.launch_angle_deg, 30.0);
        assert_eq!(config.t_max, 50.0);
        assert_eq!(config.max_step, 0.1);
        assert_eq!(config.min_event_time, 1e-3);
    }
}
