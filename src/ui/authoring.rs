use std::collections::HashMap;

use crate::content::session::SessionContent;
use crate::data::incident::IncidentType;
use crate::rules::risk::MAX_RISK;
use crate::simulation::mission::MissionTracker;

/// Plain-text overview of the loaded scenarios and locations for content authors.
pub fn render_content_dashboard(content: &SessionContent, tracker: &MissionTracker) -> String {
    let mut output = String::new();
    output.push_str("=== Content Console ===\n");

    let filter = tracker.filter();
    output.push_str(&format!("Mission: {} ({})\n", filter.label(), filter));
    output.push_str(&format!("  {}\n", filter.briefing()));
    let progress = tracker.progress(&content.registry);
    output.push_str(&format!(
        "  Progress: {}/{}\n",
        progress.completed, progress.total
    ));

    output.push_str("\nScenarios\n");
    output.push_str(&format!("  Total: {}\n", content.scenarios.len()));
    let mut empty_scenarios = 0usize;
    for scenario in &content.scenarios {
        let option_count: usize = scenario.steps.iter().map(|s| s.options.len()).sum();
        let costly = scenario
            .steps
            .iter()
            .flat_map(|s| s.options.iter())
            .filter(|o| o.is_costly())
            .count();
        let fatal = scenario
            .steps
            .iter()
            .flat_map(|s| s.options.iter())
            .filter(|o| o.risk_delta >= MAX_RISK as i32)
            .count();
        if scenario.steps.is_empty() {
            empty_scenarios += 1;
        }
        output.push_str(&format!(
            "  {} [{}]: steps={}, options={}, costly={}, fatal={}\n",
            scenario.title,
            scenario.id,
            scenario.steps.len(),
            option_count,
            costly,
            fatal
        ));
        for (idx, step) in scenario.steps.iter().enumerate() {
            if !step.options.iter().any(|o| !o.is_costly()) {
                output.push_str(&format!(
                    "    step {} has no risk-free option\n",
                    idx + 1
                ));
            }
        }
    }
    if empty_scenarios > 0 {
        output.push_str(&format!(
            "  Scenarios without steps (unplayable): {}\n",
            empty_scenarios
        ));
    }
    let uncovered: Vec<&str> = IncidentType::ALL
        .iter()
        .filter(|kind| !content.scenarios.iter().any(|s| s.id == **kind))
        .map(|kind| kind.as_str())
        .collect();
    if !uncovered.is_empty() {
        output.push_str(&format!(
            "  Incidents falling back to the first scenario: {}\n",
            uncovered.join(", ")
        ));
    }

    output.push_str("\nLocations\n");
    output.push_str(&format!("  Total: {}\n", content.registry.len()));
    let mut per_incident: HashMap<IncidentType, Vec<&str>> = HashMap::new();
    for location in content.registry.iter() {
        per_incident
            .entry(location.incident_type)
            .or_default()
            .push(location.name.as_str());
    }
    for kind in IncidentType::ALL {
        let names = per_incident.remove(&kind).unwrap_or_default();
        let marked: Vec<String> = names
            .iter()
            .map(|name| {
                if tracker.is_completed(name) {
                    format!("{}*", name)
                } else {
                    name.to_string()
                }
            })
            .collect();
        output.push_str(&format!(
            "  {}: {} [{}]\n",
            kind,
            names.len(),
            marked.join(", ")
        ));
    }

    output
}
