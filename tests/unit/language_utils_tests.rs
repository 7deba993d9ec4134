/*!
 * Tests for supported languages and ISO code utilities
 */

use backtrans::language_utils::{
    get_language_name, language_codes_match, normalize_to_part2t, validate_language_code, LanguageCodeType,
    SupportedLanguage,
};

#[test]
fn test_supportedLanguage_fromStr_withEnglishNames_shouldParse() {
    assert_eq!("Chinese".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Chinese);
    assert_eq!("thai".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Thai);
    assert_eq!(" KHMER ".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Khmer);
}

#[test]
fn test_supportedLanguage_fromStr_withChineseLabels_shouldParse() {
    assert_eq!("中文".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Chinese);
    assert_eq!("英语".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::English);
    assert_eq!("越南语".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Vietnamese);
    assert_eq!("缅甸语".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Burmese);
}

#[test]
fn test_supportedLanguage_fromStr_withIsoCodes_shouldParse() {
    let cases = [
        ("zh", SupportedLanguage::Chinese),
        ("zho", SupportedLanguage::Chinese),
        ("chi", SupportedLanguage::Chinese),
        ("cmn", SupportedLanguage::Chinese),
        ("en", SupportedLanguage::English),
        ("vi", SupportedLanguage::Vietnamese),
        ("ms", SupportedLanguage::Malay),
        ("may", SupportedLanguage::Malay),
        ("zsm", SupportedLanguage::Malay),
        ("th", SupportedLanguage::Thai),
        ("id", SupportedLanguage::Indonesian),
        ("tl", SupportedLanguage::Filipino),
        ("fil", SupportedLanguage::Filipino),
        ("my", SupportedLanguage::Burmese),
        ("bur", SupportedLanguage::Burmese),
        ("lo", SupportedLanguage::Lao),
        ("km", SupportedLanguage::Khmer),
    ];
    for (code, expected) in cases {
        assert_eq!(code.parse::<SupportedLanguage>().unwrap(), expected, "code {}", code);
    }
}

#[test]
fn test_supportedLanguage_fromStr_withUnsupported_shouldFail() {
    assert!("fr".parse::<SupportedLanguage>().is_err());
    assert!("Klingon".parse::<SupportedLanguage>().is_err());
    assert!("".parse::<SupportedLanguage>().is_err());
}

#[test]
fn test_supportedLanguage_deeplCodes_shouldMatchDeeplSupport() {
    assert_eq!(SupportedLanguage::Chinese.deepl_source_code(), Some("ZH"));
    assert_eq!(SupportedLanguage::English.deepl_source_code(), Some("EN"));
    assert_eq!(SupportedLanguage::English.deepl_target_code(), Some("EN-US"));
    assert_eq!(SupportedLanguage::Filipino.deepl_target_code(), Some("TL"));

    for language in [SupportedLanguage::Burmese, SupportedLanguage::Lao, SupportedLanguage::Khmer] {
        assert!(!language.deepl_supported());
        assert_eq!(language.deepl_source_code(), None);
        assert_eq!(language.deepl_target_code(), None);
    }
}

#[test]
fn test_supportedLanguage_all_shouldListTenLanguages() {
    assert_eq!(SupportedLanguage::ALL.len(), 10);
    assert_eq!(SupportedLanguage::Thai.to_string(), "Thai");
    assert_eq!(SupportedLanguage::Chinese.code(), "zh");
    assert!(SupportedLanguage::Chinese.is_cjk());
    assert!(!SupportedLanguage::Vietnamese.is_cjk());
}

#[test]
fn test_validate_language_code_withVariousCodes_shouldIdentifyType() {
    assert!(matches!(validate_language_code("zh").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("tha").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("bur").unwrap(), LanguageCodeType::Part2B));
    assert!(validate_language_code("xx").is_err());
}

#[test]
fn test_normalize_to_part2t_withVariousCodes_shouldNormalize() {
    assert_eq!(normalize_to_part2t("zh").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("chi").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("MY").unwrap(), "mya");
    assert!(normalize_to_part2t("invalid").is_err());
}

#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("my", "bur"));
    assert!(language_codes_match("zh", "zho"));
    assert!(!language_codes_match("zh", "th"));
    assert!(!language_codes_match("zh", "nonsense"));
}

#[test]
fn test_get_language_name_withValidCode_shouldReturnName() {
    assert_eq!(get_language_name("th").unwrap(), "Thai");
    assert_eq!(get_language_name("vie").unwrap(), "Vietnamese");
    assert!(get_language_name("xx").is_err());
}
