use serde::Serialize;

use super::schema::MunicipalityDetail;

/// Candidate count of one alliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllianceTally {
    pub nombre: String,
    pub candidates: u32,
}

/// Figures shown on the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    /// Sorted by candidate count, largest first. Ties keep payload order.
    pub alliances: Vec<AllianceTally>,
    pub total_candidates: u32,
    /// Rounded mean candidates per alliance.
    pub average: u32,
    pub top_alliance: Option<String>,
}

impl ResultsSummary {
    pub fn from_detail(detail: &MunicipalityDetail) -> Self {
        let mut alliances: Vec<AllianceTally> = detail
            .alianzas
            .iter()
            .map(|a| AllianceTally {
                nombre: a.nombre.clone(),
                candidates: a.candidatos.count(),
            })
            .collect();
        alliances.sort_by(|a, b| b.candidates.cmp(&a.candidates));

        let total_candidates: u32 = alliances.iter().map(|a| a.candidates).sum();
        let average = match alliances.len() {
            0 => 0,
            n => (f64::from(total_candidates) / n as f64).round() as u32,
        };
        let top_alliance = alliances.first().map(|a| a.nombre.clone());

        Self {
            alliances,
            total_candidates,
            average,
            top_alliance,
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.alliances.iter().map(|a| a.nombre.clone()).collect()
    }

    pub fn values(&self) -> Vec<u32> {
        self.alliances.iter().map(|a| a.candidates).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::schema::{Alliance, Candidate, Candidates};

    fn alliance(nombre: &str, concejales: usize) -> Alliance {
        Alliance {
            id: None,
            nombre: nombre.to_string(),
            candidatos: Candidates {
                intendente: Some(Candidate {
                    id: None,
                    nombre: format!("{nombre} intendente"),
                    dni: None,
                    orden: None,
                }),
                viceintendente: None,
                concejales_titulares: (0..concejales)
                    .map(|i| Candidate {
                        id: None,
                        nombre: format!("{nombre} {i}"),
                        dni: None,
                        orden: Some(i as u32 + 1),
                    })
                    .collect(),
                concejales_suplentes: Vec::new(),
            },
        }
    }

    #[test]
    fn sorts_descending_and_rounds_average() {
        let detail = MunicipalityDetail {
            id: 1,
            nombre: "Capital".into(),
            alianzas: vec![alliance("A", 1), alliance("B", 4), alliance("C", 2)],
        };
        let summary = ResultsSummary::from_detail(&detail);

        assert_eq!(summary.labels(), vec!["B", "C", "A"]);
        assert_eq!(summary.values(), vec![5, 3, 2]);
        assert_eq!(summary.total_candidates, 10);
        // 10 / 3 = 3.33
        assert_eq!(summary.average, 3);
        assert_eq!(summary.top_alliance.as_deref(), Some("B"));
    }

    #[test]
    fn empty_detail_has_zero_figures() {
        let detail = MunicipalityDetail {
            id: 1,
            nombre: "Vacío".into(),
            alianzas: Vec::new(),
        };
        let summary = ResultsSummary::from_detail(&detail);
        assert_eq!(summary.total_candidates, 0);
        assert_eq!(summary.average, 0);
        assert!(summary.top_alliance.is_none());
    }
}
