#![no_main]
use libfuzzer_sys::fuzz_target;
use roast_core::{AnalysisCfg, Analyzer, RoastSnapshot};

fuzz_target!(|data: &str| {
    // Arbitrary profile JSON must either be rejected or analyze without panicking.
    let Ok(doc) = roast_config::load_profile_json(data) else {
        return;
    };
    let Ok(snap) = RoastSnapshot::try_from(&doc) else {
        return;
    };
    if let Ok(analyzer) = Analyzer::new(AnalysisCfg::default()) {
        let _ = analyzer.analyze(&snap);
    }
});
