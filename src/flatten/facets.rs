use serde::Serialize;

use crate::ontology::TermId;

/// Search facet an ancestor is filed under. Serialized names are the JSON
/// keys of the output records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetCategory {
    Anatomy,
    CellType,
    Chebi,
    DiseaseDriver,
    Evidence,
    FoodMaterial,
    InheritancePattern,
    Ncbitaxon,
    OmimSusceptibility,
    Onset,
    Phenotype,
    Sequence,
    Symptom,
    TransmissionProcess,
    Unclassified,
}

impl FacetCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anatomy => "anatomy",
            Self::CellType => "cell_type",
            Self::Chebi => "chebi",
            Self::DiseaseDriver => "disease_driver",
            Self::Evidence => "evidence",
            Self::FoodMaterial => "food_material",
            Self::InheritancePattern => "inheritance_pattern",
            Self::Ncbitaxon => "ncbitaxon",
            Self::OmimSusceptibility => "omim_susceptibility",
            Self::Onset => "onset",
            Self::Phenotype => "phenotype",
            Self::Sequence => "sequence",
            Self::Symptom => "symptom",
            Self::TransmissionProcess => "transmission_process",
            Self::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for FacetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier prefixes with a fixed category. `HP` is handled separately
/// because it splits on the label.
const PREFIXES: [(&str, FacetCategory); 12] = [
    ("UBERON", FacetCategory::Anatomy),
    ("CL", FacetCategory::CellType),
    ("CHEBI", FacetCategory::Chebi),
    ("SYMP", FacetCategory::Symptom),
    ("DISDRIV", FacetCategory::DiseaseDriver),
    ("ECO", FacetCategory::Evidence),
    ("FOODON", FacetCategory::FoodMaterial),
    ("GENO", FacetCategory::InheritancePattern),
    ("NCBITaxon", FacetCategory::Ncbitaxon),
    ("OMIM", FacetCategory::OmimSusceptibility),
    ("SO", FacetCategory::Sequence),
    ("TRANS", FacetCategory::TransmissionProcess),
];

const PHENOTYPE_PREFIX: &str = "HP";

/// Files an ancestor under a facet by the longest matching identifier
/// prefix. Human phenotype terms go to `onset` when their label mentions
/// onset and to `phenotype` otherwise.
#[must_use]
pub fn classify(id: &TermId, label: Option<&str>) -> FacetCategory {
    let id = id.as_str();
    let longest = PREFIXES
        .iter()
        .map(|(prefix, category)| (*prefix, *category))
        .chain(std::iter::once((PHENOTYPE_PREFIX, FacetCategory::Phenotype)))
        .filter(|(prefix, _)| id.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len());

    match longest {
        Some((PHENOTYPE_PREFIX, _)) => {
            let onset = label.is_some_and(|label| label.to_lowercase().contains("onset"));
            if onset {
                FacetCategory::Onset
            } else {
                FacetCategory::Phenotype
            }
        }
        Some((_, category)) => category,
        None => FacetCategory::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{classify, FacetCategory};
    use crate::ontology::TermId;

    #[rstest]
    #[case("UBERON:0001017", None, FacetCategory::Anatomy)]
    #[case("CL:0000236", Some("B cell"), FacetCategory::CellType)]
    #[case("CHEBI:0003", None, FacetCategory::Chebi)]
    #[case("SYMP:0000570", Some("fever"), FacetCategory::Symptom)]
    #[case("DISDRIV:0000005", None, FacetCategory::DiseaseDriver)]
    #[case("ECO:0000269", None, FacetCategory::Evidence)]
    #[case("FOODON:03411564", None, FacetCategory::FoodMaterial)]
    #[case("GENO:0000147", None, FacetCategory::InheritancePattern)]
    #[case("NCBITaxon:9606", None, FacetCategory::Ncbitaxon)]
    #[case("OMIM:114480", None, FacetCategory::OmimSusceptibility)]
    #[case("SO:0001059", None, FacetCategory::Sequence)]
    #[case("TRANS:0000001", None, FacetCategory::TransmissionProcess)]
    #[case("HP:0003577", Some("Perinatal onset"), FacetCategory::Onset)]
    #[case("HP:0003581", Some("Adult ONSET"), FacetCategory::Onset)]
    #[case("HP:0002664", Some("Neoplasm"), FacetCategory::Phenotype)]
    #[case("HP:0002664", None, FacetCategory::Phenotype)]
    #[case("GO:0008150", Some("biological_process"), FacetCategory::Unclassified)]
    #[case("DOID:4", Some("disease"), FacetCategory::Unclassified)]
    fn classification(
        #[case] id: &str,
        #[case] label: Option<&str>,
        #[case] expected: FacetCategory,
    ) {
        let id = TermId::parse(id).expect("valid id");
        assert_eq!(classify(&id, label), expected);
    }

    #[test]
    fn serialized_names_match_as_str() {
        for category in [
            FacetCategory::CellType,
            FacetCategory::OmimSusceptibility,
            FacetCategory::Ncbitaxon,
        ] {
            let json = serde_json::to_string(&category).expect("serializes");
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
