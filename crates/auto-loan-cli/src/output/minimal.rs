use serde_json::Value;

use super::{result_of, scalar};

/// Print just the answer: the decision, the payment, or the digest.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(result_of(value)));
}

fn minimal_line(result: &Value) -> String {
    // evaluate
    if let Some(decision) = result.get("decision") {
        return decision_line(decision);
    }

    // reevaluate
    if let Some(record) = result.get("record") {
        let status = record.get("status").map(scalar).unwrap_or_default();
        return match record.get("offer") {
            Some(offer) if !offer.is_null() => format!("{} {}", status, payment_of(offer)),
            _ => format!("{} {}", status, record.get("rejections").map(scalar).unwrap_or_default()),
        };
    }

    for key in ["monthly_payment", "digest"] {
        if let Some(val) = result.get(key) {
            return scalar(val);
        }
    }

    scalar(result)
}

fn decision_line(decision: &Value) -> String {
    let status = decision.get("status").map(scalar).unwrap_or_default();
    match decision.get("offer") {
        Some(offer) => format!("{} {}", status, payment_of(offer)),
        None => format!("{} {}", status, decision.get("reasons").map(scalar).unwrap_or_default()),
    }
}

fn payment_of(offer: &Value) -> String {
    offer.get("monthly_payment").map(scalar).unwrap_or_default()
}
