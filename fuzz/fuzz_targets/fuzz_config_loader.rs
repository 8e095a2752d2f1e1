#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are fine; panics are not.
    if let Ok(cfg) = roast_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A validated config must always build an analyzer
            let acfg: roast_core::AnalysisCfg = (&cfg).into();
            assert!(roast_core::Analyzer::new(acfg).is_ok());
        }
    }
});
