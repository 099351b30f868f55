// ============================================================
// Layer 4 — Lemmatizer (WordNet morphy rules)
// ============================================================
// Reduces an inflected word to its dictionary base form for a
// given part of speech.
//
// For a word w and part of speech p:
//   1. If w is listed in p's exception file, the candidates are
//      w followed by its listed base forms
//   2. Otherwise the candidates are w followed by every suffix
//      substitution for p that applies to w
//   3. Candidates missing from p's lexicon are discarded
//   4. The shortest survivor wins (first on ties); with no
//      survivor, w comes back unchanged
//
// Lexical resources, in the WordNet dict/ layout:
//   index.noun / index.verb: header lines start with two
//                            spaces; the first field of every
//                            other line is a lemma
//   noun.exc / verb.exc:     "inflected base [base ...]" per line
//
// A common-vocabulary copy of the resources is compiled into
// the binary. The process-wide handle is initialised once,
// lazily, from that copy unless a directory (for instance a
// stock WordNet dict/) was installed before first use. No
// network access ever happens here.
//
// Reference: Miller (1995) WordNet: A Lexical Database for English
//            once_cell crate documentation

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;

use crate::domain::error::{PipelineError, Result, Stage};

const NOUN_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const BUNDLED_NOUN_INDEX: &str = include_str!("../../resources/wordnet/index.noun");
const BUNDLED_NOUN_EXC:   &str = include_str!("../../resources/wordnet/noun.exc");
const BUNDLED_VERB_INDEX: &str = include_str!("../../resources/wordnet/index.verb");
const BUNDLED_VERB_EXC:   &str = include_str!("../../resources/wordnet/verb.exc");

/// Index files open with a license block indented by two spaces.
const INDEX_HEADER_PREFIX: &str = "  ";

static RESOURCES: OnceCell<Lemmatizer> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    Verb,
}

impl PartOfSpeech {
    fn substitutions(self) -> &'static [(&'static str, &'static str)] {
        match self {
            PartOfSpeech::Noun => NOUN_SUBSTITUTIONS,
            PartOfSpeech::Verb => VERB_SUBSTITUTIONS,
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
        }
    }
}

/// Lemmas and irregular forms for one part of speech.
#[derive(Debug, Default)]
struct Lexicon {
    lemmas:     HashSet<String>,
    exceptions: HashMap<String, Vec<String>>,
}

impl Lexicon {
    fn parse(index: &str, exc: &str) -> Self {
        let lemmas = index
            .lines()
            .filter(|line| !line.starts_with(INDEX_HEADER_PREFIX))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect();

        let exceptions = exc
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let inflected  = fields.next()?;
                let bases: Vec<String> = fields.map(str::to_string).collect();
                (!bases.is_empty()).then(|| (inflected.to_string(), bases))
            })
            .collect();

        Self { lemmas, exceptions }
    }
}

#[derive(Debug)]
pub struct Lemmatizer {
    noun: Lexicon,
    verb: Lexicon,
}

impl Lemmatizer {
    /// Build from the text of `index.noun`, `noun.exc`, `index.verb`, `verb.exc`.
    pub fn from_sources(noun_index: &str, noun_exc: &str, verb_index: &str, verb_exc: &str) -> Self {
        Self {
            noun: Lexicon::parse(noun_index, noun_exc),
            verb: Lexicon::parse(verb_index, verb_exc),
        }
    }

    /// The copy compiled into the binary.
    pub fn bundled() -> Self {
        Self::from_sources(BUNDLED_NOUN_INDEX, BUNDLED_NOUN_EXC, BUNDLED_VERB_INDEX, BUNDLED_VERB_EXC)
    }

    /// Read `index.noun`, `noun.exc`, `index.verb`, `verb.exc` from a
    /// WordNet `dict/` directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let read = |name: String| {
            let path = dir.join(name);
            fs::read_to_string(&path)
                .map_err(|e| PipelineError::io(Stage::Lexicon, path.display().to_string(), e))
        };
        let mut parts = Vec::with_capacity(4);
        for pos in [PartOfSpeech::Noun, PartOfSpeech::Verb] {
            parts.push(read(format!("index.{}", pos.file_stem()))?);
            parts.push(read(format!("{}.exc", pos.file_stem()))?);
        }
        Ok(Self::from_sources(&parts[0], &parts[1], &parts[2], &parts[3]))
    }

    fn lexicon(&self, pos: PartOfSpeech) -> &Lexicon {
        match pos {
            PartOfSpeech::Noun => &self.noun,
            PartOfSpeech::Verb => &self.verb,
        }
    }

    /// Base form of `word` for `pos`, or `word` itself when unknown.
    pub fn lemmatize(&self, word: &str, pos: PartOfSpeech) -> String {
        self.candidates(word, pos)
            .into_iter()
            .min_by_key(|c| c.chars().count())
            .unwrap_or_else(|| word.to_string())
    }

    fn candidates(&self, word: &str, pos: PartOfSpeech) -> Vec<String> {
        let lexicon = self.lexicon(pos);

        let mut forms = vec![word.to_string()];
        match lexicon.exceptions.get(word) {
            Some(bases) => forms.extend(bases.iter().cloned()),
            None => forms.extend(
                pos.substitutions()
                    .iter()
                    .filter_map(|(old, new)| word.strip_suffix(old).map(|stem| format!("{stem}{new}"))),
            ),
        }

        let mut seen = HashSet::new();
        forms
            .into_iter()
            .filter(|f| lexicon.lemmas.contains(f) && seen.insert(f.clone()))
            .collect()
    }
}

/// Use the resources in `dir` for the rest of the process.
///
/// Must run before the first call to [`global`]; a second
/// installation is rejected.
pub fn install_from_dir(dir: &Path) -> Result<()> {
    let lemmatizer = Lemmatizer::from_dir(dir)?;
    RESOURCES.set(lemmatizer).map_err(|_| {
        PipelineError::schema(Stage::Lexicon, "lexical resources were already initialised")
    })?;
    tracing::info!("Using lexical resources from '{}'", dir.display());
    Ok(())
}

/// The process-wide lemmatizer.
pub fn global() -> &'static Lemmatizer {
    RESOURCES.get_or_init(|| {
        tracing::debug!("Loading bundled lexical resources");
        Lemmatizer::bundled()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    fn small() -> Lemmatizer {
        Lemmatizer::from_sources(
            "house\nflood\ncity\nchild\nbox\nflooding\n",
            "children child\n",
            "be\nneed\nflood\nhouse\nhope\nrun\n",
            "was be\nrunning run\n",
        )
    }

    #[test]
    fn test_regular_noun_plurals() {
        let l = small();
        assert_eq!(l.lemmatize("houses", PartOfSpeech::Noun), "house");
        assert_eq!(l.lemmatize("cities", PartOfSpeech::Noun), "city");
        assert_eq!(l.lemmatize("boxes", PartOfSpeech::Noun), "box");
    }

    #[test]
    fn test_exception_lists() {
        let l = small();
        assert_eq!(l.lemmatize("children", PartOfSpeech::Noun), "child");
        assert_eq!(l.lemmatize("was", PartOfSpeech::Verb), "be");
        assert_eq!(l.lemmatize("running", PartOfSpeech::Verb), "run");
    }

    #[test]
    fn test_verb_suffixes_pick_shortest_lemma() {
        let l = small();
        assert_eq!(l.lemmatize("needed", PartOfSpeech::Verb), "need");
        assert_eq!(l.lemmatize("hoped", PartOfSpeech::Verb), "hope");
        // "flooding" is a noun lemma itself but reduces further as a verb
        assert_eq!(l.lemmatize("flooding", PartOfSpeech::Noun), "flooding");
        assert_eq!(l.lemmatize("flooding", PartOfSpeech::Verb), "flood");
    }

    #[test]
    fn test_unknown_words_pass_through() {
        let l = small();
        assert_eq!(l.lemmatize("xyzzy", PartOfSpeech::Noun), "xyzzy");
        assert_eq!(l.lemmatize("123", PartOfSpeech::Verb), "123");
        assert_eq!(l.lemmatize("", PartOfSpeech::Noun), "");
    }

    #[test]
    fn test_bundled_resources_load() {
        let l = Lemmatizer::bundled();
        assert_eq!(l.lemmatize("earthquakes", PartOfSpeech::Noun), "earthquake");
        assert_eq!(l.lemmatize("were", PartOfSpeech::Verb), "be");
        assert_eq!(l.lemmatize("women", PartOfSpeech::Noun), "woman");
    }

    #[test]
    fn test_bundled_resources_cover_everyday_plurals() {
        let l = Lemmatizer::bundled();
        for (plural, lemma) in [
            ("pipes", "pipe"),
            ("shoes", "shoe"),
            ("mudslides", "mudslide"),
            ("candles", "candle"),
            ("buckets", "bucket"),
            ("pumps", "pump"),
            ("tanks", "tank"),
            ("toilets", "toilet"),
            ("mosquitoes", "mosquito"),
            ("aftershocks", "aftershock"),
        ] {
            assert_eq!(l.lemmatize(plural, PartOfSpeech::Noun), lemma, "{plural}");
        }
        assert_eq!(l.lemmatize("swept", PartOfSpeech::Verb), "sweep");
        assert_eq!(l.lemmatize("vaccinated", PartOfSpeech::Verb), "vaccinate");
    }

    #[test]
    fn test_bundled_index_header_is_not_a_lemma() {
        let l = Lemmatizer::bundled();
        assert!(!l.noun.lemmas.contains("1"));
        assert!(!l.noun.lemmas.contains("Common"));
        assert!(l.noun.lemmas.contains("pipe"));
    }

    #[test]
    fn test_from_dir_reads_wordnet_dict_layout() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("index.noun"),
            "  1 This software and database is being provided to you, the LICENSEE, by\n  \
             2 Princeton University under the following license.\n\
             pipe n 9 5 @ ~ #p %p + 9 1 03944672 03944302\n\
             tent n 1 3 @ ~ + 1 1 04411264\n\
             water_pump n 1 1 @ 1 0 04562262\n",
        )
        .unwrap();
        fs::write(dir.path().join("noun.exc"), "mosquitoes mosquito\n").unwrap();
        fs::write(dir.path().join("index.verb"), "  1 header\ngo v 30 5 @ ~ * > ^ 30 23 02016523\n").unwrap();
        fs::write(dir.path().join("verb.exc"), "went go\n").unwrap();

        let l = Lemmatizer::from_dir(dir.path()).unwrap();
        assert_eq!(l.lemmatize("pipes", PartOfSpeech::Noun), "pipe");
        assert_eq!(l.lemmatize("tents", PartOfSpeech::Noun), "tent");
        assert_eq!(l.lemmatize("went", PartOfSpeech::Verb), "go");
        // header line numbers and synset offsets are not lemmas
        assert!(!l.noun.lemmas.contains("1"));
        assert!(!l.noun.lemmas.contains("2"));
        assert!(!l.noun.lemmas.contains("03944672"));
        assert!(l.noun.lemmas.contains("water_pump"));
        // exception bases must themselves be indexed
        assert_eq!(l.lemmatize("mosquitoes", PartOfSpeech::Noun), "mosquitoes");

        fs::remove_file(dir.path().join("verb.exc")).unwrap();
        assert_eq!(Lemmatizer::from_dir(dir.path()).unwrap_err().kind(), ErrorKind::Io);
    }
}
