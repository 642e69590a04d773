use super::FairnessSnapshot;
use crate::model::GroupId;
use serde::{Deserialize, Serialize};

/// Scores d'équité dans [0, 1] ; 1 = pile sur la moyenne du groupe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessScore {
    pub regular: f64,
    pub weighted: f64,
    pub overall: f64,
}

/// `1 - |x - moyenne| / moyenne`, borné à [0, 1] ; moyenne nulle = 1.
fn closeness(value: f64, average: f64) -> f64 {
    if average <= 0.0 {
        return 1.0;
    }
    (1.0 - (value - average).abs() / average).clamp(0.0, 1.0)
}

pub fn fairness_score(
    days: f64,
    average_days: f64,
    weighted: f64,
    average_weighted: f64,
) -> FairnessScore {
    let regular = closeness(days, average_days);
    let weighted = closeness(weighted, average_weighted);
    FairnessScore {
        regular,
        weighted,
        overall: (regular + weighted) / 2.0,
    }
}

/// Indicateurs de dispersion d'un groupe sur une année.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub group_id: GroupId,
    pub year: i32,
    pub member_count: usize,
    pub average_days: f64,
    pub average_weighted: f64,
    /// Écart-type (population) des cumuls pondérés.
    pub weighted_std_dev: f64,
    pub max_weighted_diff: f64,
    pub max_total_diff: u32,
    pub members: Vec<FairnessSnapshot>,
}

/// Calcule les indicateurs et renseigne le score de chaque membre.
pub fn group_metrics(
    group_id: &GroupId,
    year: i32,
    mut members: Vec<FairnessSnapshot>,
) -> GroupMetrics {
    if members.is_empty() {
        return GroupMetrics {
            group_id: group_id.clone(),
            year,
            member_count: 0,
            average_days: 0.0,
            average_weighted: 0.0,
            weighted_std_dev: 0.0,
            max_weighted_diff: 0.0,
            max_total_diff: 0,
            members,
        };
    }

    let n = members.len() as f64;
    let average_days = members.iter().map(|m| f64::from(m.total_days)).sum::<f64>() / n;
    let average_weighted = members.iter().map(|m| m.weighted_days).sum::<f64>() / n;
    let variance = members
        .iter()
        .map(|m| (m.weighted_days - average_weighted).powi(2))
        .sum::<f64>()
        / n;

    let weighted_min = members.iter().map(|m| m.weighted_days).fold(f64::INFINITY, f64::min);
    let weighted_max = members
        .iter()
        .map(|m| m.weighted_days)
        .fold(f64::NEG_INFINITY, f64::max);
    let total_min = members.iter().map(|m| m.total_days).min().unwrap_or(0);
    let total_max = members.iter().map(|m| m.total_days).max().unwrap_or(0);

    for member in &mut members {
        member.fairness_score = Some(fairness_score(
            f64::from(member.total_days),
            average_days,
            member.weighted_days,
            average_weighted,
        ));
    }

    GroupMetrics {
        group_id: group_id.clone(),
        year,
        member_count: members.len(),
        average_days,
        average_weighted,
        weighted_std_dev: variance.sqrt(),
        max_weighted_diff: weighted_max - weighted_min,
        max_total_diff: total_max - total_min,
        members,
    }
}
