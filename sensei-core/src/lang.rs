//! # Detecção de Idioma
//!
//! O detector é um colaborador externo ([`LanguageDetector`]); o padrão
//! ([`StopwordDetector`]) conta palavras funcionais de cada idioma. Textos
//! longos não são enviados inteiros: [`detect_lang`] tenta prefixos
//! crescentes (100, 200 … 1000 caracteres) e devolve o primeiro resultado.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::stopwords;
use crate::tokenizer::char_slice;

/// Textos até este tamanho são detectados de uma vez.
pub const DETECTION_LIMIT: usize = 1000;
/// Passo de crescimento dos prefixos em textos longos.
pub const DETECTION_STEP: usize = 100;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:(?:https?|ftp)://|www\.)\S+").expect("regex de URL"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\w+").expect("regex de e-mail"));
static NON_LETTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\s]+").expect("regex de não-letras"));
static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("regex de espaços"));
static IS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:https?|ftp)://|www\.)[^\s/$.?#][^\s]*$").expect("regex de URL inteira")
});

/// Detector de idioma plugável.
pub trait LanguageDetector: Send + Sync {
    /// Código ISO 639-1 do idioma, ou `None` se não for possível decidir.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Detector por contagem de stopwords.
///
/// Exige `min_hits` ocorrências e um único idioma vencedor; empates contam
/// como ambíguos.
#[derive(Debug, Clone)]
pub struct StopwordDetector {
    min_hits: usize,
}

impl StopwordDetector {
    pub fn new(min_hits: usize) -> Self {
        Self { min_hits }
    }
}

impl Default for StopwordDetector {
    fn default() -> Self {
        Self::new(2)
    }
}

impl LanguageDetector for StopwordDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return None;
        }

        let mut hits: HashMap<&str, usize> = HashMap::new();
        for lang in stopwords::languages() {
            let list = stopwords::for_lang(lang)?;
            let count = words.iter().filter(|w| list.contains(&w.as_str())).count();
            hits.insert(lang, count);
        }

        let best = hits.values().copied().max().unwrap_or(0);
        if best < self.min_hits {
            return None;
        }
        let mut winners = hits.iter().filter(|(_, &c)| c == best).map(|(l, _)| *l);
        match (winners.next(), winners.next()) {
            (Some(lang), None) => Some(lang.to_string()),
            _ => None,
        }
    }
}

/// Limpeza agressiva antes da detecção: remove URLs e e-mails, troca tudo
/// que não é letra por espaço e colapsa espaços.
pub fn cleanup_hard(text: &str) -> String {
    let text = URL_RE.replace_all(text, " ");
    let text = EMAIL_RE.replace_all(&text, " ");
    let text = NON_LETTER_RE.replace_all(&text, " ");
    SPACES_RE.replace_all(&text, " ").trim().to_string()
}

/// Detecta o idioma de `text` (ver doc do módulo).
pub fn detect_lang(detector: &dyn LanguageDetector, text: &str) -> Option<String> {
    let detect = |txt: &str| detector.detect(&cleanup_hard(txt));

    if text.chars().count() <= DETECTION_LIMIT {
        return detect(text);
    }

    (DETECTION_STEP..=DETECTION_LIMIT)
        .step_by(DETECTION_STEP)
        .find_map(|n| detect(char_slice(text, 0, n)))
}

/// Remove termos que são URLs e tira espaços das bordas dos demais.
pub fn remove_urls<'a, I>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    terms
        .into_iter()
        .map(str::trim)
        .filter(|t| !IS_URL_RE.is_match(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_detect_english() {
        let d = StopwordDetector::default();
        assert_eq!(
            d.detect("the company said that it will open a new office in the city").as_deref(),
            Some("en")
        );
    }

    #[test]
    fn test_detect_german_and_french() {
        let d = StopwordDetector::default();
        assert_eq!(
            d.detect("der Hund und die Katze sind nicht im Haus").as_deref(),
            Some("de")
        );
        assert_eq!(
            d.detect("le chat est dans la maison avec les enfants").as_deref(),
            Some("fr")
        );
    }

    #[test]
    fn test_too_short_is_none() {
        let d = StopwordDetector::default();
        assert_eq!(d.detect("Berlin"), None);
        assert_eq!(d.detect(""), None);
    }

    #[test]
    fn test_cleanup_hard() {
        assert_eq!(
            cleanup_hard("See https://example.com/x?a=1 or mail me@example.org, ok!!  42"),
            "See or mail ok"
        );
    }

    #[test]
    fn test_remove_urls() {
        let terms = vec![" https://rust-lang.org ", "  crate ", "www.example.com", "ftp"];
        assert_eq!(remove_urls(terms), vec!["crate", "ftp"]);
    }

    struct CountingDetector {
        calls: AtomicUsize,
        answer_after: usize,
    }

    impl LanguageDetector for CountingDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= self.answer_after).then(|| "en".to_string())
        }
    }

    #[test]
    fn test_long_text_uses_growing_prefixes() {
        let text = "word ".repeat(400);
        let d = CountingDetector {
            calls: AtomicUsize::new(0),
            answer_after: 3,
        };
        assert_eq!(detect_lang(&d, &text).as_deref(), Some("en"));
        assert_eq!(d.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_long_text_gives_up_after_limit() {
        let text = "x".repeat(5000);
        let d = CountingDetector {
            calls: AtomicUsize::new(0),
            answer_after: usize::MAX,
        };
        assert_eq!(detect_lang(&d, &text), None);
        assert_eq!(d.calls.load(Ordering::SeqCst), DETECTION_LIMIT / DETECTION_STEP);
    }

    #[test]
    fn test_short_text_detected_once() {
        let d = CountingDetector {
            calls: AtomicUsize::new(0),
            answer_after: 1,
        };
        assert_eq!(detect_lang(&d, "short").as_deref(), Some("en"));
        assert_eq!(d.calls.load(Ordering::SeqCst), 1);
    }
}
