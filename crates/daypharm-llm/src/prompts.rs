//! Prompts for the pharmacy assistant.
//!
//! These prompts target Gemini models and ask for Korean output.

use daypharm_core::models::{join_display_names, ChatMessage, ChatRole, PatientData};

/// Number of past chat messages carried into a chat prompt.
pub const CHAT_HISTORY_WINDOW: usize = 10;

/// Prescription bag extraction prompt (sent together with the photo).
pub const EXTRACTION_PROMPT: &str = r#"이 이미지는 한국 약봉투이거나 약 정보가 적힌 사진입니다.
가능하면 환자 이름과 나이도 같이 뽑아주세요.
아래 JSON 형식으로만 응답하세요.

{
    "name": "환자 이름 (없으면 \"\")",
    "age": "나이 (숫자만, 없으면 \"\")",
    "medications": [
        {
            "name": "약 이름",
            "dosage": "용량 (예: 500mg)",
            "frequency": "복용 횟수 (예: 1일 3회)",
            "timing": "복용 시간 (예: 아침 식후, 점심 식후, 저녁 식후, 취침 전 중 택1)",
            "duration": "복용 기간 (예: 7일)"
        }
    ]
}

글씨가 안 보이면 가능한 것만 추론해서 채우고, 없는 건 빈 문자열로 두세요."#;

/// Instruction appended to every chat question.
pub const SAFETY_INSTRUCTION: &str =
    "안전하게 설명하고, 위험하거나 모호하면 '가까운 약국/의료진에게 문의'라고 써주세요.";

/// Report text shown when no API key is configured.
pub const NO_API_KEY_REPORT: &str =
    "⚠️ Gemini API 키를 입력하면 여기서 실제 리포트를 생성할 수 있습니다.";

/// Chat reply shown when no API key is configured.
pub const NO_API_KEY_CHAT: &str =
    "Gemini API 키를 넣으면 여기서 약사 스타일로 답변해줄 수 있어요 🙂";

/// Message shown when extraction is attempted without an API key.
pub const NO_API_KEY_EXTRACTION: &str = "Gemini API Key를 먼저 입력해주세요.";

/// Generic caution shown instead of AI interaction analysis.
pub const STATIC_INTERACTION_NOTICE: &str = "위 약들은 위장장애, 간독성, 어지러움 같은 부작용이 있을 수 있으니 증상이 지속되면 약사에게 문의하세요.";

/// Footer for pharmacist-facing views.
pub const PHARMACIST_DISCLAIMER: &str =
    "⚠️ 이 앱은 보조 도구입니다. 환자에게 제공할 때에는 반드시 마지막으로 의사나 약사의 확인이 필요합니다.";

/// Footer for patient-facing views.
pub const PATIENT_DISCLAIMER: &str =
    "⚠️ 이 앱은 약 복용 보조 도구입니다. 의학적 조언이 필요한 경우 반드시 의사나 약사와 상담하세요.";

/// Pharmacist report prompt.
pub fn make_report_prompt(patient: &PatientData, context: Option<&str>) -> String {
    let extra = match context.map(str::trim) {
        Some(context) if !context.is_empty() => format!("[참고 데이터]\n{}", context),
        _ => String::new(),
    };

    format!(
        r#"당신은 한국 약국에서 일하는 약사입니다.
아래 환자 정보를 읽고,
1) 환자에게 설명해줄 문장,
2) 약사 메모,
3) 주의해야 할 점
을 한국어로 작성하세요.
너무 길지 않게, A4 1장 안에서 끝나도록 합니다.

[환자 정보]
이름: {}
나이: {}
성별: {}
진단/질환: {}
복용약: {}

[약사 메모]
{}

{}"#,
        patient.name,
        patient.age,
        patient.gender,
        patient.conditions,
        join_display_names(&patient.medications),
        patient.memo,
        extra
    )
}

/// Interaction warning prompt.
pub fn make_interaction_prompt(medications: &[String]) -> String {
    format!(
        "다음 약들을 함께 복용할 때 주의사항과 피해야 할 음식/음료를 한국어로 정리해줘: {}",
        medications.join(", ")
    )
}

/// Chat prompt with medication context, recent history and the safety caveat.
pub fn make_chat_prompt(history: &[ChatMessage], medications: &[String], question: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("당신은 한국 약국의 약사입니다.\n");
    prompt.push_str(&format!("환자가 지금 먹는 약: {}\n", medications.join(", ")));

    let start = history.len().saturating_sub(CHAT_HISTORY_WINDOW);
    let recent = &history[start..];
    if !recent.is_empty() {
        prompt.push_str("[이전 대화]\n");
        for message in recent {
            let speaker = match message.role {
                ChatRole::User => "환자",
                ChatRole::Assistant => "약사",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, message.content));
        }
    }

    prompt.push_str(&format!("환자 질문: {}\n", question));
    prompt.push_str(SAFETY_INSTRUCTION);
    prompt
}
