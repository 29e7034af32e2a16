//! Listas de stopwords usadas pela detecção de idioma e pelo extrator de
//! keyphrases. Listas curtas, só com as palavras funcionais mais frequentes.

/// Idioma (código ISO 639-1) → nome da lista (convenção do NLTK).
const LANG_NAMES: &[(&str, &str)] = &[
    ("en", "english"),
    ("de", "german"),
    ("fr", "french"),
    ("es", "spanish"),
    ("it", "italian"),
    ("nl", "dutch"),
    ("pl", "polish"),
    ("cs", "czech"),
];

const ENGLISH: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "are", "as", "at", "be", "been", "but",
    "by", "can", "for", "from", "had", "has", "have", "he", "her", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "more", "not", "of", "on", "or", "our", "she", "so", "than",
    "that", "the", "their", "them", "there", "these", "they", "this", "to", "was", "we", "were",
    "what", "when", "which", "who", "will", "with", "would", "you",
];

const GERMAN: &[&str] = &[
    "aber", "als", "am", "an", "auch", "auf", "aus", "bei", "bis", "das", "dass", "dem", "den",
    "der", "des", "die", "ein", "eine", "einem", "einen", "einer", "es", "für", "hat", "ich",
    "ist", "im", "in", "mit", "nach", "nicht", "noch", "oder", "sich", "sie", "sind", "und",
    "von", "vor", "war", "wie", "wir", "wird", "zu", "zum", "zur",
];

const FRENCH: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "dans", "de", "des", "du", "elle", "en", "est", "et", "il",
    "ils", "je", "la", "le", "les", "leur", "mais", "ne", "nous", "ou", "par", "pas", "pour",
    "qui", "que", "sa", "se", "son", "sont", "sur", "un", "une", "vous", "été", "être",
];

const SPANISH: &[&str] = &[
    "al", "como", "con", "de", "del", "el", "en", "es", "esta", "este", "fue", "ha", "la", "las",
    "lo", "los", "más", "no", "para", "pero", "por", "que", "se", "sin", "su", "sus", "también",
    "un", "una", "y", "ya",
];

const ITALIAN: &[&str] = &[
    "al", "alla", "anche", "che", "come", "con", "da", "del", "della", "di", "e", "gli", "ha",
    "il", "in", "la", "le", "lo", "ma", "nel", "nella", "non", "per", "più", "si", "sono", "su",
    "un", "una", "è",
];

const DUTCH: &[&str] = &[
    "aan", "als", "bij", "dat", "de", "die", "dit", "een", "en", "er", "het", "hij", "in", "is",
    "maar", "met", "naar", "niet", "of", "om", "ook", "op", "te", "tot", "van", "voor", "was",
    "wat", "worden", "zijn",
];

const POLISH: &[&str] = &[
    "a", "ale", "by", "być", "do", "i", "jak", "jest", "jego", "już", "na", "nie", "o", "od",
    "oraz", "po", "przez", "się", "tak", "także", "to", "w", "we", "z", "za", "że",
];

const CZECH: &[&str] = &[
    "a", "aby", "ale", "do", "i", "jak", "je", "jeho", "jsou", "k", "na", "než", "o", "od",
    "po", "pro", "s", "se", "také", "to", "už", "v", "ve", "z", "za", "že",
];

/// Idiomas com lista de stopwords.
pub fn languages() -> impl Iterator<Item = &'static str> {
    LANG_NAMES.iter().map(|(lang, _)| *lang)
}

/// Lista pelo código do idioma (ex: "en").
pub fn for_lang(lang: &str) -> Option<&'static [&'static str]> {
    LANG_NAMES
        .iter()
        .find(|(code, _)| *code == lang)
        .and_then(|(_, name)| by_name(name))
}

/// Lista pelo nome (ex: "english", como nos parâmetros do vetorizador).
pub fn by_name(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "english" => Some(ENGLISH),
        "german" => Some(GERMAN),
        "french" => Some(FRENCH),
        "spanish" => Some(SPANISH),
        "italian" => Some(ITALIAN),
        "dutch" => Some(DUTCH),
        "polish" => Some(POLISH),
        "czech" => Some(CZECH),
        _ => None,
    }
}
