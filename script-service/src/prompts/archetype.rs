//! Content archetypes and duration structure profiles.

use super::scenario::{detect_scenario_from_topic, Scenario};
use super::system::Persona;
use crate::models::VideoDuration;

/// Delivery mode the script is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    Storytime,
    Expert,
    Savage,
    Drama,
}

/// Role, structure and tone for one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub role: &'static str,
    pub structure: &'static str,
    pub format_rule: &'static str,
    pub tone: &'static str,
}

/// Format rule used for long videos, whatever the archetype.
pub const PARAGRAPH_FORMAT_RULE: &str =
    "Write 3-4 spoken paragraphs separated by \\n. NO bullet points, no numbered lists.";

impl Archetype {
    /// Explicit vibe mapping. Returns `None` for vibes that only carry a style.
    pub fn from_vibe(vibe: &str) -> Option<Self> {
        match vibe.trim().to_lowercase().as_str() {
            "storytime" | "story" | "storytelling" | "kể chuyện" => Some(Archetype::Storytime),
            "expert" | "educational" | "chuyên gia" => Some(Archetype::Expert),
            "savage" | "roast" | "controversial" | "gây tranh cãi" => Some(Archetype::Savage),
            "drama" | "dramatic" => Some(Archetype::Drama),
            _ => None,
        }
    }

    /// Default archetype for a detected scenario.
    pub fn for_scenario(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Story => Archetype::Storytime,
            Scenario::Knowledge => Archetype::Expert,
            Scenario::Opinion => Archetype::Savage,
        }
    }

    /// Scenario whose hooks fit this archetype.
    pub fn scenario(&self) -> Scenario {
        match self {
            Archetype::Storytime | Archetype::Drama => Scenario::Story,
            Archetype::Expert => Scenario::Knowledge,
            Archetype::Savage => Scenario::Opinion,
        }
    }

    pub fn persona(&self) -> Persona {
        match self {
            Archetype::Storytime | Archetype::Drama => Persona::Storyteller,
            Archetype::Expert => Persona::Expert,
            Archetype::Savage => Persona::GenZ,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Storytime => "STORYTIME",
            Archetype::Expert => "EXPERT",
            Archetype::Savage => "SAVAGE",
            Archetype::Drama => "DRAMA",
        }
    }

    pub fn profile(&self) -> ArchetypeProfile {
        match self {
            Archetype::Storytime => ArchetypeProfile {
                role: "A relatable vlogger sharing personal experiences.",
                structure: "NARRATIVE ARC (Context -> Conflict -> Climax -> Resolution).",
                format_rule: "First-person spoken sentences. Use 'Tui' (I) and 'Mấy bà' (You).",
                tone: "Emotional, whispering, confessional.",
            },
            Archetype::Expert => ArchetypeProfile {
                role: "A no-nonsense industry expert.",
                structure: "EDUCATIONAL LISTICLE (Hook -> The Problem -> 3 Steps Solution).",
                format_rule: "Use bullet points (•) or numbered steps for clarity.",
                tone: "Authoritative, helpful, direct.",
            },
            Archetype::Savage => ArchetypeProfile {
                role: "A brutal reviewer who hates mediocrity.",
                structure: "ARGUMENTATIVE (Controversial Hook -> Roast the bad -> Praise the good).",
                format_rule: "Short, punchy sentences. Rhetorical questions.",
                tone: "Aggressive, witty, sarcastic. Vocabulary: 'Dẹp ngay', 'Phí tiền', 'Tỉnh lại đi'.",
            },
            Archetype::Drama => ArchetypeProfile {
                role: "An insider spilling the tea.",
                structure: "NEWS FLASH (Breaking News Hook -> The Details -> The Question).",
                format_rule: "Fast-paced reporting style.",
                tone: "Urgent, suspenseful, gossip-style. Vocabulary: 'Biến căng', 'Chấn động'.",
            },
        }
    }
}

/// Archetype and scenario chosen for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSelection {
    pub archetype: Archetype,
    pub scenario: Scenario,
    /// True when the vibe named the archetype directly.
    pub explicit: bool,
}

/// Pick the archetype from the vibe, falling back to topic detection.
pub fn select_mode(vibe: &str, topic: &str) -> ModeSelection {
    match Archetype::from_vibe(vibe) {
        Some(archetype) => ModeSelection {
            archetype,
            scenario: archetype.scenario(),
            explicit: true,
        },
        None => {
            let scenario = detect_scenario_from_topic(topic);
            ModeSelection {
                archetype: Archetype::for_scenario(scenario),
                scenario,
                explicit: false,
            }
        }
    }
}

/// Length and structure instructions for a duration bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationProfile {
    pub length: &'static str,
    pub structure: &'static str,
    pub example: &'static str,
}

impl DurationProfile {
    pub fn for_duration(duration: VideoDuration) -> Self {
        match duration {
            VideoDuration::Short => DurationProfile {
                length: "15-30 seconds, about 40-80 spoken words.",
                structure: "Hook, then 3-4 bullet points (•), each at most 15 words, then the CTA.",
                example: "• Uống nước đá ngay sau khi ăn? Sai bét!\n\
                          • Dạ dày phải gồng lên để làm ấm lại\n\
                          • Tiêu hoá chậm hẳn, đầy bụng cả buổi\n\
                          • Đợi 30 phút rồi hãy uống nha",
            },
            VideoDuration::Medium => DurationProfile {
                length: "30-60 seconds, about 80-150 spoken words.",
                structure: "One-sentence intro, then 3-5 bullet points with a concrete detail each, then one closing line before the CTA.",
                example: "Ai cũng nghĩ ngủ trưa càng lâu càng khoẻ.\n\
                          • Ngủ quá 30 phút, cơ thể vào giấc sâu\n\
                          • Bị đánh thức giữa chừng là đầu óc lơ mơ cả chiều\n\
                          • 20 phút là con số vàng các nhà khoa học khuyên\n\
                          Nên từ mai đặt báo thức 20 phút thôi nhé!",
            },
            VideoDuration::Long => DurationProfile {
                length: "60-90 seconds, about 150-250 spoken words.",
                structure: "3-4 spoken paragraphs that flow like a conversation. NO bullet points.",
                example: "Bạn biết tại sao ăn trái cây buổi sáng lại khác hoàn toàn buổi tối không?\n\
                          Buổi sáng, cơ thể bạn đang cần năng lượng nhanh. Đường fructose trong trái cây được hấp thu ngay, giúp bạn tỉnh táo.\n\
                          Nhưng buổi tối? Cơ thể không cần năng lượng nữa. Lượng đường đó dễ chuyển thành mỡ bụng.\n\
                          Nên từ giờ, ăn trái cây trước 2h chiều thôi nhé!",
            },
        }
    }
}

/// Format rule after applying the duration override.
pub fn format_rule(archetype: Archetype, duration: VideoDuration) -> &'static str {
    match duration {
        VideoDuration::Long => PARAGRAPH_FORMAT_RULE,
        _ => archetype.profile().format_rule,
    }
}
