//! Bilingual enrichment of draft records.
//!
//! Chooses between three strategies, in order: the title is already Chinese,
//! remote metadata for the catalog code, or machine translation of the
//! title. `enrich` never fails; every provider problem degrades to the
//! translation tier.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::lang::contains_chinese;
use crate::metadata::{MetaCandidate, MetadataProvider};
use crate::record::{DraftRecord, EnrichedRecord, MetadataSource};
use crate::translate::Translator;

/// Fills in the bilingual fields of a draft record.
pub struct Enricher {
    provider: Arc<dyn MetadataProvider>,
    translator: Arc<dyn Translator>,
    src_lang: String,
    tgt_lang: String,
}

impl Enricher {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        translator: Arc<dyn Translator>,
        translate_config: &TranslateConfig,
    ) -> Self {
        Self {
            provider,
            translator,
            src_lang: translate_config.src_lang.clone(),
            tgt_lang: translate_config.tgt_lang.clone(),
        }
    }

    /// Enrich a draft. Deterministic given the draft and the injected
    /// provider/translator responses.
    pub async fn enrich(&self, draft: DraftRecord) -> EnrichedRecord {
        let mut record = EnrichedRecord::from_draft(draft);

        // Tier 1: already localized.
        if contains_chinese(&record.title) {
            record.title_cn = Some(record.title.clone());
            record.source = MetadataSource::None;
            return record;
        }

        // Tier 2: remote metadata, when we have a code to look up.
        let code = match &record.code {
            Some(c) if !c.is_empty() => c.clone(),
            _ => return self.translate_title(record).await,
        };

        match self.provider.lookup(&code).await {
            Ok(Some(candidate)) => {
                debug!(code = %code, provider = self.provider.name(), "metadata hit");
                self.adopt_candidate(record, candidate).await
            }
            Ok(None) => {
                debug!(code = %code, "no metadata candidate, falling back to translation");
                self.translate_title(record).await
            }
            Err(e) => {
                warn!(code = %code, error = %e, "metadata lookup failed, falling back to translation");
                self.translate_title(record).await
            }
        }
    }

    /// Tier 2: the candidate is authoritative for its fields.
    async fn adopt_candidate(
        &self,
        mut record: EnrichedRecord,
        candidate: MetaCandidate,
    ) -> EnrichedRecord {
        record.studio = candidate.studio;
        record.studio_cn = candidate.studio_cn;
        record.actresses = candidate.actresses;
        record.actresses_cn = candidate.actresses_cn;
        record.tags = candidate.tags;
        record.tags_cn = candidate.tags_cn;
        record.release_date = candidate.release_date;
        record.cover_url = candidate.cover_url;

        record.title_cn = candidate.title_cn.or(candidate.title);

        // The candidate title may itself be Japanese/English; translate it,
        // adopting the result only when it actually changed something.
        if let Some(title_cn) = &record.title_cn {
            if !contains_chinese(title_cn) {
                let translated = self
                    .translator
                    .translate(title_cn, &self.src_lang, &self.tgt_lang)
                    .await;
                if !translated.is_empty() && translated != *title_cn {
                    record.title_cn = Some(translated);
                }
            }
        }

        // Tags: translate wholesale only when the provider gave none in
        // Chinese and the adopted list is entirely non-Chinese.
        if !record.tags.is_empty()
            && record.tags_cn.is_empty()
            && record.tags.iter().all(|t| !contains_chinese(t))
        {
            let translated = self
                .translator
                .translate_list(&record.tags, &self.src_lang, &self.tgt_lang)
                .await;
            if !translated.is_empty() && translated != record.tags {
                record.tags_cn = translated;
            }
        }

        // Studio, same adopt-only-if-different rule.
        if let Some(studio) = record.studio.clone() {
            if !studio.is_empty() && !contains_chinese(&studio) {
                let translated = self
                    .translator
                    .translate(&studio, &self.src_lang, &self.tgt_lang)
                    .await;
                if !translated.is_empty() && translated != studio {
                    record.studio_cn = Some(translated);
                }
            }
        }

        record.source = MetadataSource::Metatube;
        record
    }

    /// Tier 3: best-effort direct translation of the original title.
    async fn translate_title(&self, mut record: EnrichedRecord) -> EnrichedRecord {
        if record.title.is_empty() {
            return record;
        }

        let translated = self
            .translator
            .translate(&record.title, &self.src_lang, &self.tgt_lang)
            .await;

        if !translated.is_empty() && translated != record.title {
            record.title_cn = Some(translated);
            record.source = MetadataSource::Translated;
        } else {
            record.title_cn = Some(record.title.clone());
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, MockTranslator};

    const MAGNET: &str = "magnet:?xt=urn:btih:1234567890abcdef1234567890abcdef12345678";

    fn draft(title: &str, code: Option<&str>) -> DraftRecord {
        DraftRecord {
            code: code.map(|c| c.to_string()),
            title: title.to_string(),
            raw_text: String::new(),
            size_label: Some("3.5GB".to_string()),
            is_uncensored: false,
            images: vec![],
            magnets: vec![MAGNET.to_string()],
            source_url: "https://example.com/thread-1-1-1.html".to_string(),
        }
    }

    fn enricher(provider: MockProvider, translator: MockTranslator) -> Enricher {
        Enricher::new(
            Arc::new(provider),
            Arc::new(translator),
            &TranslateConfig::default(),
        )
    }

    fn candidate() -> MetaCandidate {
        MetaCandidate {
            code: "STARS123".to_string(),
            code_display: "STARS-123".to_string(),
            title: Some("Japanese Title".to_string()),
            title_cn: Some("中文标题".to_string()),
            studio: Some("SOD".to_string()),
            studio_cn: None,
            actresses: vec!["Yua".to_string()],
            actresses_cn: vec!["悠亚".to_string()],
            tags: vec!["Solo".to_string()],
            tags_cn: vec![],
            release_date: Some("2024-06-15".to_string()),
            cover_url: Some("https://img/cover.jpg".to_string()),
        }
    }

    #[tokio::test]
    async fn test_chinese_title_short_circuits() {
        let provider = MockProvider::new();
        let e = enricher(provider, MockTranslator::new());

        let record = e.enrich(draft("STARS-123 测试影片", Some("STARS-123"))).await;

        assert_eq!(record.title_cn.as_deref(), Some("STARS-123 测试影片"));
        assert_eq!(record.source, MetadataSource::None);
    }

    #[tokio::test]
    async fn test_chinese_title_skips_provider() {
        let provider = MockProvider::new();
        let recorded = provider.recorded();
        let e = enricher(provider, MockTranslator::new());

        e.enrich(draft("测试", Some("STARS-123"))).await;
        assert!(recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_candidate_fields_adopted() {
        let provider = MockProvider::new();
        provider.set_candidate(candidate());
        let e = enricher(provider, MockTranslator::new());

        let record = e.enrich(draft("STARS-123 Japanese Title", Some("STARS-123"))).await;

        assert_eq!(record.title_cn.as_deref(), Some("中文标题"));
        assert_eq!(record.studio.as_deref(), Some("SOD"));
        assert_eq!(record.actresses, vec!["Yua"]);
        assert_eq!(record.actresses_cn, vec!["悠亚"]);
        assert_eq!(record.release_date.as_deref(), Some("2024-06-15"));
        assert_eq!(record.cover_url.as_deref(), Some("https://img/cover.jpg"));
        assert_eq!(record.source, MetadataSource::Metatube);
    }

    #[tokio::test]
    async fn test_non_chinese_candidate_title_translated() {
        let provider = MockProvider::new();
        let mut c = candidate();
        c.title_cn = None;
        provider.set_candidate(c);

        let translator = MockTranslator::new();
        translator.map("Japanese Title", "日文标题");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(record.title_cn.as_deref(), Some("日文标题"));
        assert_eq!(record.source, MetadataSource::Metatube);
    }

    #[tokio::test]
    async fn test_candidate_title_kept_when_translation_is_identity() {
        let provider = MockProvider::new();
        let mut c = candidate();
        c.title_cn = None;
        provider.set_candidate(c);
        let e = enricher(provider, MockTranslator::new());

        let record = e.enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(record.title_cn.as_deref(), Some("Japanese Title"));
    }

    #[tokio::test]
    async fn test_tags_translated_when_provider_gave_none() {
        let provider = MockProvider::new();
        provider.set_candidate(candidate());
        let translator = MockTranslator::new();
        translator.map("Solo", "单人");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(record.tags_cn, vec!["单人"]);
    }

    #[tokio::test]
    async fn test_provider_tags_cn_not_overwritten() {
        let provider = MockProvider::new();
        let mut c = candidate();
        c.tags_cn = vec!["原始".to_string()];
        provider.set_candidate(c);
        let translator = MockTranslator::new();
        translator.map("Solo", "单人");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(record.tags_cn, vec!["原始"]);
    }

    #[tokio::test]
    async fn test_studio_translated_when_different() {
        let provider = MockProvider::new();
        provider.set_candidate(candidate());
        let translator = MockTranslator::new();
        translator.map("SOD", "桃色公司");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(record.studio_cn.as_deref(), Some("桃色公司"));
    }

    #[tokio::test]
    async fn test_no_candidate_translates_title() {
        let provider = MockProvider::new();
        let translator = MockTranslator::new();
        translator.map("Plain Title", "翻译标题");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("Plain Title", Some("STARS-123"))).await;
        assert_eq!(record.title_cn.as_deref(), Some("翻译标题"));
        assert_eq!(record.source, MetadataSource::Translated);
    }

    #[tokio::test]
    async fn test_no_candidate_identity_translation_keeps_source_none() {
        let provider = MockProvider::new();
        let e = enricher(provider, MockTranslator::new());

        let record = e.enrich(draft("Plain Title", Some("STARS-123"))).await;
        assert_eq!(record.title_cn.as_deref(), Some("Plain Title"));
        assert_eq!(record.source, MetadataSource::None);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back_to_translation() {
        let provider = MockProvider::new();
        provider.fail_next("backend down");
        let translator = MockTranslator::new();
        translator.map("Plain Title", "翻译标题");
        let e = enricher(provider, translator);

        let record = e.enrich(draft("Plain Title", Some("STARS-123"))).await;
        assert_eq!(record.title_cn.as_deref(), Some("翻译标题"));
        assert_eq!(record.source, MetadataSource::Translated);
    }

    #[tokio::test]
    async fn test_missing_code_goes_straight_to_translation() {
        let provider = MockProvider::new();
        let recorded = provider.recorded();
        let e = enricher(provider, MockTranslator::new());

        let record = e.enrich(draft("Plain Title", None)).await;
        assert_eq!(record.title_cn.as_deref(), Some("Plain Title"));
        assert!(recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enrich_is_deterministic() {
        let make = || {
            let provider = MockProvider::new();
            provider.set_candidate(candidate());
            let translator = MockTranslator::new();
            translator.map("Solo", "单人");
            enricher(provider, translator)
        };

        let a = make().enrich(draft("STARS-123", Some("STARS-123"))).await;
        let b = make().enrich(draft("STARS-123", Some("STARS-123"))).await;
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
