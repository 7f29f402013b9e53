//! Symptom catalog and disease label table.
//!
//! A [`KnowledgeBase`] is built once, never mutated, and lent to every
//! [`Predictor`](crate::Predictor) that uses it. The order of the catalog is
//! the positional encoding the classifier was trained on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::KnowledgeBaseError;

/// Label returned when the classifier emits a class with no disease entry.
pub const UNRESOLVED_LABEL: &str = "prediction could not be resolved";

/// Shown next to every prediction by the presentation layer.
pub const DISCLAIMER: &str = "This is a preliminary computer prediction and does not replace \
consultation with a qualified medical professional.";

/// One clinical observation the system can record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symptom {
    pub code: String,
    pub label: String,
    pub description: String,
}

impl Symptom {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Symptom {
            code: code.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Ordered, immutable set of symptom codes.
#[derive(Debug, Clone)]
pub struct SymptomCatalog {
    symptoms: Vec<Symptom>,
    positions: HashMap<String, usize>,
}

impl SymptomCatalog {
    /// Builds a catalog, rejecting an empty list and duplicated codes.
    pub fn new(symptoms: Vec<Symptom>) -> Result<Self, KnowledgeBaseError> {
        if symptoms.is_empty() {
            return Err(KnowledgeBaseError::EmptyCatalog);
        }
        let mut positions = HashMap::with_capacity(symptoms.len());
        for (i, symptom) in symptoms.iter().enumerate() {
            if positions.insert(symptom.code.clone(), i).is_some() {
                return Err(KnowledgeBaseError::DuplicateSymptom(symptom.code.clone()));
            }
        }
        Ok(SymptomCatalog {
            symptoms,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Symptom> {
        self.position(code).map(|i| &self.symptoms[i])
    }

    /// Index of `code` in the feature vector.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.positions.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.positions.contains_key(code)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symptom> {
        self.symptoms.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.symptoms.iter().map(|s| s.code.as_str())
    }
}

impl<'a> IntoIterator for &'a SymptomCatalog {
    type Item = &'a Symptom;
    type IntoIter = std::slice::Iter<'a, Symptom>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Classifier class index to disease descriptor.
#[derive(Debug, Clone, Default)]
pub struct DiseaseTable {
    labels: BTreeMap<usize, String>,
}

impl DiseaseTable {
    pub fn new<I, S>(entries: I) -> Result<Self, KnowledgeBaseError>
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        let mut labels = BTreeMap::new();
        for (class, label) in entries {
            if labels.insert(class, label.into()).is_some() {
                return Err(KnowledgeBaseError::DuplicateClass(class));
            }
        }
        if labels.is_empty() {
            return Err(KnowledgeBaseError::EmptyDiseaseTable);
        }
        Ok(DiseaseTable { labels })
    }

    pub fn resolve(&self, class: usize) -> Option<&str> {
        self.labels.get(&class).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().map(|(class, label)| (*class, label.as_str()))
    }
}

/// What to do with mapping keys that are not in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSymptomPolicy {
    /// Fail with [`PredictError::UnknownSymptom`](crate::PredictError::UnknownSymptom).
    #[default]
    Reject,
    /// Drop unknown keys silently.
    Ignore,
}

/// Catalog, label table and input policy, shared by reference.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    catalog: SymptomCatalog,
    diseases: DiseaseTable,
    unknown_symptoms: UnknownSymptomPolicy,
}

#[derive(Deserialize)]
struct KnowledgeBaseFile {
    symptoms: Vec<Symptom>,
    diseases: Vec<DiseaseEntry>,
    #[serde(default)]
    unknown_symptoms: UnknownSymptomPolicy,
}

#[derive(Deserialize)]
struct DiseaseEntry {
    class: usize,
    label: String,
}

impl KnowledgeBase {
    pub fn new(catalog: SymptomCatalog, diseases: DiseaseTable) -> Self {
        KnowledgeBase {
            catalog,
            diseases,
            unknown_symptoms: UnknownSymptomPolicy::default(),
        }
    }

    pub fn with_unknown_symptom_policy(mut self, policy: UnknownSymptomPolicy) -> Self {
        self.unknown_symptoms = policy;
        self
    }

    /// The built-in pregnancy complication tables: symptoms G1..G25, diseases P001..P005.
    pub fn pregnancy() -> Self {
        let symptoms = PREGNANCY_SYMPTOMS
            .iter()
            .map(|(code, label, description)| Symptom::new(*code, *label, *description))
            .collect::<Vec<_>>();
        let positions = symptoms
            .iter()
            .enumerate()
            .map(|(i, s)| (s.code.clone(), i))
            .collect();
        let labels = PREGNANCY_DISEASES
            .iter()
            .map(|(class, label)| (*class, label.to_string()))
            .collect();
        KnowledgeBase::new(
            SymptomCatalog {
                symptoms,
                positions,
            },
            DiseaseTable { labels },
        )
    }

    /// Reads a knowledge base from a JSON document.
    ///
    /// ```json
    /// {
    ///   "symptoms": [{ "code": "G1", "label": "...", "description": "..." }],
    ///   "diseases": [{ "class": 0, "label": "..." }],
    ///   "unknown_symptoms": "reject"
    /// }
    /// ```
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, KnowledgeBaseError> {
        let file: KnowledgeBaseFile = serde_json::from_reader(reader)?;
        let catalog = SymptomCatalog::new(file.symptoms)?;
        let diseases = DiseaseTable::new(file.diseases.into_iter().map(|d| (d.class, d.label)))?;
        Ok(KnowledgeBase::new(catalog, diseases).with_unknown_symptom_policy(file.unknown_symptoms))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, KnowledgeBaseError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn catalog(&self) -> &SymptomCatalog {
        &self.catalog
    }

    pub fn diseases(&self) -> &DiseaseTable {
        &self.diseases
    }

    pub fn unknown_symptoms(&self) -> UnknownSymptomPolicy {
        self.unknown_symptoms
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::pregnancy()
    }
}

const PREGNANCY_SYMPTOMS: [(&str, &str, &str); 25] = [
    ("G1", "Usia hamil 7 bulan / lebih", "Kehamilan sudah memasuki usia 7 bulan atau lebih, mendekati masa persalinan"),
    ("G2", "Mual", "Perasaan ingin muntah yang sering terjadi, terutama pada trimester pertama"),
    ("G3", "Muntah", "Mengeluarkan isi perut melalui mulut, dapat terjadi akibat berbagai kondisi"),
    ("G4", "Kejang", "Gerakan otot yang tidak terkontrol, bisa menandakan kondisi serius"),
    ("G5", "Proteinuria lebih dari 3g/liter", "Adanya protein berlebih dalam urin, bisa menjadi tanda preeklampsia"),
    ("G6", "Tekanan darah >=160/110 mmHg", "Tekanan darah tinggi yang berbahaya, membutuhkan perhatian medis segera"),
    ("G7", "Pusing", "Rasa berputar atau tidak seimbang di kepala"),
    ("G8", "Nyeri ulu hati", "Rasa sakit atau tidak nyaman di area ulu hati"),
    ("G9", "Nyeri perut bagian bawah", "Nyeri atau rasa sakit di bagian bawah perut"),
    ("G10", "Nyeri perut pada satu sisi kanan/kiri", "Nyeri yang terlokalisir di satu sisi perut kanan atau kiri"),
    ("G11", "Nyeri hebat tiba - tiba", "Rasa sakit yang tiba-tiba dan sangat intens"),
    ("G12", "Perdarahan dari jalan lahir", "Keluarnya darah dari jalan lahir di luar masa haid atau persalinan"),
    ("G13", "Perdarahan dari jalan lahir warna kehitaman", "Perdarahan dengan warna gelap atau kehitaman, bisa menandakan masalah serius"),
    ("G14", "Kematian janin", "Tidak adanya tanda-tanda kehidupan pada janin"),
    ("G15", "Syok", "Kondisi kritis akibat penurunan aliran darah ke organ vital"),
    ("G16", "Pemeriksaan dinding rahim", "Pemeriksaan fisik pada dinding rahim oleh tenaga medis"),
    ("G17", "Tampak pucat", "Wajah terlihat pucat, bisa menandakan anemia atau kondisi lain"),
    ("G18", "Air kencing berwarna kemerahan", "Urin berwarna kemerahan, bisa menandakan adanya darah"),
    ("G19", "Tekanan darah turun sampai dibawah 90/60 mmHg", "Tekanan darah turun drastis, berbahaya bagi ibu hamil"),
    ("G20", "Nadi cepat", "Detak jantung yang lebih cepat dari normal"),
    ("G21", "Kontraksi dari rahim", "Gerakan berkontraksi pada otot rahim"),
    ("G22", "Jumlah perdarahan sedikit", "Jumlah perdarahan yang relatif sedikit"),
    ("G23", "Produksi urin sedikit", "Produksi urin yang menurun"),
    ("G24", "Kontraksi Rahim yang hilang", "Hilangnya kontraksi rahim yang normal"),
    ("G25", "Kesadaran menurun", "Penurunan tingkat kesadaran atau responsivitas"),
];

const PREGNANCY_DISEASES: [(usize, &str); 5] = [
    (0, "P001 Abortus (keluarnya janin sebelum masa visibilitas)"),
    (1, "P002 Hamil ekstrauteri ektopik terganggu (hamil yang berkembang diluar rahim)"),
    (2, "P003 Solusio plasenta (lepasnya plasenta dari dinding rahim)"),
    (3, "P004 Preekslampsia berat (suatu komplikasi ditandai dengan hipertensi)"),
    (4, "P005 Rupture uteri (robeknya dinding rahim)"),
];
