//! Decision cycle tests: fusion rules, justification text and fault injection.

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use crate::logic::air_quality::{AqiSource, AqiValue, FixedAqiSource, ReductionAdvisor};
    use crate::logic::assisted::{AssistedService, DecisionSource, RequestKind, ServiceError};
    use crate::logic::features::FEATURE_COUNT;
    use crate::logic::fusion::engine::MAINTAINED_NOTE;
    use crate::logic::fusion::{
        build_justification, fuse_limits, FusionEngine, DEFAULT_JUSTIFICATION,
    };
    use crate::logic::model::{
        ModelArtifacts, NearAccidentPredictor, PredictionMethod, StandardScaler,
    };
    use crate::logic::router::AssistedRouter;
    use crate::logic::testing::{ScriptedService, StubModel};
    use crate::logic::weather::SensorSnapshot;

    fn engine_with(
        service: Option<Arc<ScriptedService>>,
        model: Option<Arc<StubModel>>,
        aqi: AqiValue,
    ) -> FusionEngine {
        let service = service.map(|s| s as Arc<dyn AssistedService>);
        let artifacts = model.map(|m| ModelArtifacts {
            model: m,
            scaler: Arc::new(StandardScaler::new([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT])),
        });

        FusionEngine::new(
            AssistedRouter::new(service.clone()),
            NearAccidentPredictor::new(artifacts),
            Arc::new(FixedAqiSource(aqi)),
            ReductionAdvisor::new(service),
        )
    }

    fn fallback_engine(aqi: AqiValue) -> FusionEngine {
        FusionEngine::fallback_only(Arc::new(FixedAqiSource(aqi)))
    }

    // ------------------------------------------------------------------------
    // Fallback-only scenarios
    // ------------------------------------------------------------------------

    #[test]
    fn test_default_limit_without_risk() {
        let (limit, reason) = fallback_engine(40).decide(1000.0, 500.0, 10.0, 12);
        assert_eq!(limit, 80);
        assert_eq!(reason, DEFAULT_JUSTIFICATION);
    }

    #[test]
    fn test_darkness_reduces_to_60() {
        let (limit, reason) = fallback_engine(40).decide(100.0, 500.0, 10.0, 12);
        assert_eq!(limit, 60);
        assert_eq!(
            reason,
            "Darkness (illuminance < 500 millilux); \
             Near-accident safety heuristic predicts 1.5 near-accidents/hr, reducing speed by 20 km/h."
        );
    }

    #[test]
    fn test_black_ice_reduces_to_60() {
        let (limit, reason) = fallback_engine(40).decide(1000.0, 1500.0, -5.0, 12);
        assert_eq!(limit, 60);
        assert!(reason.contains("black ice"));
        assert!(!reason.contains("Darkness"));
    }

    #[test]
    fn test_air_quality_only() {
        let (limit, reason) = fallback_engine(120).decide(1000.0, 500.0, 10.0, 18);
        assert_eq!(limit, 60);
        assert_eq!(
            reason,
            "Poor air quality (AQI: 120) leading to 20 km/h reduction by rule-based recommendation."
        );
    }

    #[test]
    fn test_weather_and_moderate_aqi_stay_at_60() {
        for aqi in [40, 75, 120] {
            let (limit, reason) = fallback_engine(aqi).decide(100.0, 500.0, 10.0, 18);
            assert_eq!(limit, 60, "aqi {}", aqi);
            assert!(reason.contains("Darkness"));
        }
    }

    #[test]
    fn test_reductions_never_sum() {
        let (limit, reason) = fallback_engine(180).decide(100.0, 500.0, 10.0, 18);
        assert_eq!(limit, 50);
        assert!(reason.contains("Darkness"));
        assert!(reason.contains("AQI: 180"));
        assert_eq!(reason.matches("; ").count(), 2);
    }

    // ------------------------------------------------------------------------
    // Assisted paths
    // ------------------------------------------------------------------------

    #[test]
    fn test_router_no_skips_predictor_and_keeps_limit() {
        let service = Arc::new(ScriptedService::new(Ok("NO".to_string()), Ok("0".to_string())));
        let model = Arc::new(StubModel::returning(Ok(3.0)));
        let engine = engine_with(Some(service.clone()), Some(model.clone()), 40);

        let (decision, trace) = engine.decide_traced(SensorSnapshot::new(100.0, 500.0, 10.0, 12));

        assert_eq!(decision.speed_limit_kmh, 80);
        assert!(decision.justification.starts_with("Darkness"));
        assert!(decision.justification.ends_with(MAINTAINED_NOTE));
        assert!(!model.was_called());
        assert!(trace.prediction.is_none());
        assert_eq!(trace.route.source, DecisionSource::Assisted);
        assert_eq!(trace.route.response.as_deref(), Some("NO"));
        assert_eq!(service.calls(), vec![RequestKind::Route, RequestKind::Reduction]);
    }

    #[test]
    fn test_router_yes_runs_model() {
        let service = Arc::new(ScriptedService::new(Ok("YES".to_string()), Ok("0".to_string())));
        let model = Arc::new(StubModel::returning(Ok(1.5)));
        let engine = engine_with(Some(service), Some(model.clone()), 40);

        let (decision, trace) = engine.decide_traced(SensorSnapshot::new(100.0, 500.0, 10.0, 12));

        assert_eq!(decision.speed_limit_kmh, 60);
        assert!(decision.justification.contains("Near-accident model predicts 1.5"));
        assert!(model.was_called());
        assert_eq!(trace.prediction.map(|p| p.method), Some(PredictionMethod::Model));
        assert_eq!(trace.weather_reduction_kmh, 20);
    }

    #[test]
    fn test_low_model_prediction_keeps_limit_with_note() {
        let model = Arc::new(StubModel::returning(Ok(0.4)));
        let engine = engine_with(None, Some(model), 40);

        let (limit, reason) = engine.decide(100.0, 500.0, 10.0, 12);
        assert_eq!(limit, 80);
        assert_eq!(reason, format!("Darkness (illuminance < 500 millilux){}", MAINTAINED_NOTE));
    }

    #[test]
    fn test_assisted_reduction_is_used() {
        let service = Arc::new(ScriptedService::new(Ok("NO".to_string()), Ok("25".to_string())));
        let engine = engine_with(Some(service), None, 40);

        let (decision, trace) = engine.decide_traced(SensorSnapshot::new(1000.0, 500.0, 10.0, 12));
        assert_eq!(decision.speed_limit_kmh, 55);
        assert_eq!(trace.aqi_reduction.source, DecisionSource::Assisted);
        assert!(decision.justification.contains("by assisted recommendation"));
    }

    #[test]
    fn test_oversized_assisted_reduction_clamped_at_zero() {
        let service = Arc::new(ScriptedService::new(Ok("NO".to_string()), Ok("500".to_string())));
        let engine = engine_with(Some(service), None, 40);

        let (limit, _) = engine.decide(1000.0, 500.0, 10.0, 12);
        assert_eq!(limit, 0);
    }

    // ------------------------------------------------------------------------
    // Fault injection
    // ------------------------------------------------------------------------

    #[test]
    fn test_transport_failure_routes_to_exact_fallbacks() {
        for error in [
            ServiceError::Network("connection refused".to_string()),
            ServiceError::Timeout,
            ServiceError::Unauthorized,
            ServiceError::Status(503),
        ] {
            let service = Arc::new(ScriptedService::failing(error));
            let engine = engine_with(Some(service), None, 180);

            let (decision, trace) = engine.decide_traced(SensorSnapshot::new(100.0, 500.0, 10.0, 18));

            assert_eq!(decision.speed_limit_kmh, 50);
            assert!(trace.route.should_run_predictor);
            assert_eq!(trace.route.source, DecisionSource::Fallback);
            assert_eq!(trace.aqi_reduction.amount_kmh, 30);
            assert_eq!(trace.aqi_reduction.source, DecisionSource::Fallback);
        }
    }

    #[test]
    fn test_malformed_replies_route_to_fallbacks() {
        let service = Arc::new(ScriptedService::new(
            Ok("I am not sure".to_string()),
            Ok("about twenty".to_string()),
        ));
        let engine = engine_with(Some(service), None, 75);

        let (decision, trace) = engine.decide_traced(SensorSnapshot::new(1000.0, 1500.0, -5.0, 8));

        assert_eq!(trace.route.source, DecisionSource::Fallback);
        assert_eq!(trace.route.response.as_deref(), Some("I am not sure"));
        assert_eq!(trace.aqi_reduction.amount_kmh, 10);
        assert_eq!(decision.speed_limit_kmh, 60);
    }

    #[test]
    fn test_model_failure_uses_safety_fallback() {
        let model = Arc::new(StubModel::returning(Ok(f64::INFINITY)));
        let engine = engine_with(None, Some(model), 40);

        let (decision, trace) = engine.decide_traced(SensorSnapshot::new(1000.0, 1500.0, -5.0, 12));
        assert_eq!(decision.speed_limit_kmh, 60);
        assert_eq!(trace.prediction.map(|p| p.method), Some(PredictionMethod::Fallback));
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    #[test]
    fn test_limit_always_within_bounds() {
        let replies = ["0", "10", "30", "79", "80", "81", "4294967295", "junk"];
        for reply in replies {
            for aqi in [0, 50, 101, 151, 500] {
                let service = Arc::new(ScriptedService::new(
                    Ok("YES".to_string()),
                    Ok(reply.to_string()),
                ));
                let engine = engine_with(Some(service), None, aqi);

                for (light, water, temp) in [
                    (0.0, 0.0, 20.0),
                    (100.0, 2000.0, -10.0),
                    (1000.0, 500.0, 10.0),
                    (f64::NAN, f64::NAN, f64::NAN),
                ] {
                    let (limit, _) = engine.decide(light, water, temp, 12);
                    assert!((0..=80).contains(&limit), "reply {} aqi {} gave {}", reply, aqi, limit);
                }
            }
        }
    }

    #[test]
    fn test_darkness_note_regardless_of_router_and_aqi() {
        for route in ["YES", "NO", "garbage"] {
            for aqi in [10, 120, 200] {
                let service = Arc::new(ScriptedService::new(Ok(route.to_string()), Err(ServiceError::Timeout)));
                let engine = engine_with(Some(service), None, aqi);

                let (_, reason) = engine.decide(499.0, 0.0, 15.0, 12);
                assert!(reason.contains("Darkness"), "route {} aqi {}", route, aqi);

                let (_, reason) = engine.decide(800.0, 1001.0, -0.5, 12);
                assert!(reason.contains("black ice"), "route {} aqi {}", route, aqi);
            }
        }
    }

    #[test]
    fn test_idempotent_with_fixed_source() {
        let engine = fallback_engine(120);
        let first = engine.decide(100.0, 1500.0, -3.0, 7);
        let second = engine.decide(100.0, 1500.0, -3.0, 7);
        assert_eq!(first, second);
    }

    #[test]
    fn test_trace_serializes() {
        let (_, trace) = fallback_engine(75).decide_traced(SensorSnapshot::new(100.0, 0.0, 5.0, 9));
        let json = serde_json::to_value(&trace).unwrap();

        assert_eq!(json["decision"]["speed_limit_kmh"], 60);
        assert_eq!(json["route"]["source"], "fallback");
        assert_eq!(json["prediction"]["method"], "fallback");
        assert_eq!(json["aqi"], 75);
        assert!(json["cycle_id"].is_string());
    }

    // ------------------------------------------------------------------------
    // Concurrent path
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let engine = Arc::new(fallback_engine(180));
        let snapshot = SensorSnapshot::new(100.0, 500.0, 10.0, 18);

        let sequential = engine.decide_snapshot(snapshot);
        let (concurrent, trace) = Arc::clone(&engine).decide_concurrent(snapshot).await;

        assert_eq!(sequential, concurrent);
        assert_eq!(trace.aqi, Some(180));
        assert_eq!(engine.predictor_status().inference_count, 2);
    }

    #[tokio::test]
    async fn test_concurrent_with_failing_service() {
        let service = Arc::new(ScriptedService::failing(ServiceError::Timeout));
        let engine = Arc::new(engine_with(Some(service.clone()), None, 40));

        let (decision, _) = engine.decide_concurrent(SensorSnapshot::new(1000.0, 500.0, 10.0, 12)).await;

        assert_eq!(decision.speed_limit_kmh, 80);
        assert_eq!(decision.justification, DEFAULT_JUSTIFICATION);
        let mut calls = service.calls();
        calls.sort_by_key(|k| *k as u8);
        assert_eq!(calls, vec![RequestKind::Route, RequestKind::Reduction]);
    }

    struct BrokenAqiSource;

    impl AqiSource for BrokenAqiSource {
        fn aqi_for_hour(&self, _hour_of_day: u8) -> AqiValue {
            panic!("sensor feed unavailable");
        }
    }

    #[tokio::test]
    async fn test_concurrent_survives_broken_aqi_source() {
        let engine = Arc::new(FusionEngine::fallback_only(Arc::new(BrokenAqiSource)));

        let (decision, trace) = engine.decide_concurrent(SensorSnapshot::new(100.0, 500.0, 10.0, 18)).await;

        assert_eq!(decision.speed_limit_kmh, 60);
        assert!(!decision.justification.contains("air quality"));
        assert_eq!(trace.aqi, None);
        assert_eq!(trace.aqi_reduction.amount_kmh, 0);
        assert_eq!(trace.aqi_reduction.source, DecisionSource::Fallback);
    }

    // ------------------------------------------------------------------------
    // Pure helpers
    // ------------------------------------------------------------------------

    #[test]
    fn test_fuse_limits() {
        assert_eq!(fuse_limits(0, 0), 80);
        assert_eq!(fuse_limits(20, 0), 60);
        assert_eq!(fuse_limits(20, 10), 60);
        assert_eq!(fuse_limits(20, 20), 60);
        assert_eq!(fuse_limits(20, 30), 50);
        assert_eq!(fuse_limits(0, 30), 50);
        assert_eq!(fuse_limits(u32::MAX, 0), 0);
    }

    #[test]
    fn test_build_justification() {
        assert_eq!(build_justification(&[], 80), DEFAULT_JUSTIFICATION);
        assert_eq!(
            build_justification(&["a".to_string(), "b".to_string()], 60),
            "a; b"
        );
        assert_eq!(
            build_justification(&["a".to_string()], 80),
            format!("a{}", MAINTAINED_NOTE)
        );
    }
}
