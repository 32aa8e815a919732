//! Fixed corpus of passages indexed at startup.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Topic passages served when no `rag.corpus_path` is configured.
const BUILTIN_CORPUS: [&str; 16] = [
    "Artificial Intelligence (AI) is the simulation of human intelligence in machines, enabling tasks like reasoning and learning.",
    "Retrieval-Augmented Generation (RAG) combines retrieval of relevant documents with a language model to generate accurate answers.",
    "Machine learning is a subset of AI that focuses on training models to make predictions based on data.",
    "Natural Language Processing (NLP) is the ability of computers to understand and manipulate human language.",
    "Deep learning is a subset of machine learning that uses neural networks to learn and make predictions.",
    "Computer vision is the ability of computers to understand and interpret visual information.",
    "Generative AI is the use of AI to create new content, such as art or music.",
    "Chatbots are AI-powered conversational interfaces that can simulate human conversation.",
    "Robotics is the study and design of machines that can perform tasks that typically require human intelligence.",
    "Augmented Reality (AR) is a technology that overlays digital information onto the real world.",
    "Virtual Reality (VR) is a technology that creates a simulated environment that can be experienced fully immersed.",
    "Blockchain is a distributed ledger technology that enables secure and transparent transactions.",
    "Cybersecurity is the practice of protecting systems, networks, and data from digital attacks.",
    "Cloud computing is the delivery of computing services over the internet, allowing for scalable and flexible resources.",
    "Big data refers to the large volume of data that can be analyzed for insights and decision-making.",
    "Internet of Things (IoT) is the network of physical devices connected to the internet, enabling data exchange and automation.",
];

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus is empty")]
    Empty,
    #[error("corpus entry {0} is blank")]
    BlankEntry(usize),
    #[error("failed to read corpus file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corpus file {path} must be a YAML list of strings: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Immutable text unit; identity is its position in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub index: usize,
    pub text: String,
}

/// The ordered, immutable corpus.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    passages: Vec<Passage>,
}

impl DocumentStore {
    /// Every entry becomes exactly one passage; entries are never merged or split.
    pub fn new<I, S>(texts: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let passages = texts
            .into_iter()
            .enumerate()
            .map(|(index, text)| {
                let text = text.into();
                if text.trim().is_empty() {
                    return Err(CorpusError::BlankEntry(index));
                }
                Ok(Passage { index, text })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if passages.is_empty() {
            return Err(CorpusError::Empty);
        }
        Ok(Self { passages })
    }

    pub fn builtin() -> Self {
        Self {
            passages: BUILTIN_CORPUS
                .iter()
                .enumerate()
                .map(|(index, text)| Passage {
                    index,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, CorpusError> {
        let contents = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let texts: Vec<String> =
            serde_yaml::from_str(&contents).map_err(|source| CorpusError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(texts)
    }

    /// Built-in corpus unless a path is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, CorpusError> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}
