//! Scenario detection and the viral hook library.
//!
//! Keyword lists and hooks target Vietnamese TikTok audiences; a handful of
//! English signals are included for mixed-language topics.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad content shape of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scenario {
    Story,
    Knowledge,
    Opinion,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Story => "STORY",
            Scenario::Knowledge => "KNOWLEDGE",
            Scenario::Opinion => "OPINION",
        }
    }

    pub fn hooks(&self) -> &'static [&'static str] {
        match self {
            Scenario::Story => &STORY_HOOKS,
            Scenario::Knowledge => &KNOWLEDGE_HOOKS,
            Scenario::Opinion => &OPINION_HOOKS,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STORY_SIGNALS: &[&str] = &[
    "người yêu", "crush", "bạn thân", "sếp", "mẹ", "bố", "gia đình",
    "hôm nay", "hôm qua", "về quê", "đi làm", "đi học",
    "bị lừa", "bị block", "bị chửi", "bị đuổi",
    "tui", "tôi đã", "mình đã", "chuyện là",
    "pov:", "story:", "kể chuyện", "storytime",
];

const OPINION_SIGNALS: &[&str] = &[
    "review", "đánh giá", "nghĩ sao", "có nên",
    "vs", "hay", "tốt hơn", "nên mua", "nên chọn",
    "tranh cãi", "so sánh", "phí tiền", "đáng tiền",
    "iphone", "samsung", "shopee", "lazada", "worth it",
];

/// Classify a topic by keyword.
///
/// Case-insensitive whole-word match: a signal hits when its words appear as
/// a contiguous run of the topic's words, so "mẹ" does not match "mẹo".
/// STORY signals are checked before OPINION signals and anything else is
/// KNOWLEDGE.
pub fn detect_scenario_from_topic(topic: &str) -> Scenario {
    let topic = topic.to_lowercase();
    let topic_words = words(&topic);

    let hits = |signals: &[&str]| {
        signals.iter().any(|signal| {
            let needle = words(signal);
            !needle.is_empty()
                && topic_words
                    .windows(needle.len())
                    .any(|run| run == needle.as_slice())
        })
    };

    if hits(STORY_SIGNALS) {
        return Scenario::Story;
    }
    if hits(OPINION_SIGNALS) {
        return Scenario::Opinion;
    }
    Scenario::Knowledge
}

fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

const STORY_HOOKS: [&str; 18] = [
    "Toang rồi mấy bà ơi! Chuyện là thế này...",
    "Không thể tin được! Hôm nay tui đã...",
    "Cái kết đắng cho những ai tin người như tui...",
    "Bóc phốt chính bản thân mình vì cái tội...",
    "Mấy bà ơi biến căng! Tui vừa phát hiện ra...",
    "Ông nào cũng bị như tui thì giơ tay...",
    "POV: Crush nhắn tin lúc 2h sáng và bạn...",
    "POV: Mẹ gọi tên đầy đủ họ tên và bạn biết...",
    "Tui kể mấy bà nghe chuyện này nè, căng lắm...",
    "Ai từng bị như tui thì comment đi...",
    "Chuyện có thật 100%! Hôm qua tui đi...",
    "Và đây là lý do tui trust issue từ đó đến giờ...",
    "Điều tui sắp kể sẽ khiến bạn sốc...",
    "Tui đã khóc khi biết sự thật này...",
    "Đây là câu chuyện tui chưa bao giờ kể ai...",
    "Bạn thân 10 năm và cái kết không ngờ...",
    "Sếp nói một câu khiến tui muốn nghỉ việc luôn...",
    "Crush cuối cùng cũng nhắn tin, nhưng...",
];

const KNOWLEDGE_HOOKS: [&str; 18] = [
    "Dừng ngay việc [Topic] lại nếu không muốn hối hận!",
    "99% người Việt đang làm sai điều này về [Topic]...",
    "Sự thật ngã ngửa về [Topic] mà không ai nói cho bạn biết.",
    "Vứt ngay cái này đi nếu bạn vẫn đang dùng!",
    "Bạn đang phí tiền vào [Topic] mà không biết...",
    "Dẹp ngay thói quen này trước khi quá muộn!",
    "Mẹo này tiết kiệm cả triệu mà ít ai biết...",
    "Bí mật mà các chuyên gia [Topic] không muốn bạn biết...",
    "Tui mất 3 năm mới học được điều này về [Topic]...",
    "Top 3 sai lầm chí mạng khi [Topic]...",
    "Đây là lý do bạn vẫn thất bại với [Topic]...",
    "Hack cuộc sống: Mẹo [Topic] mà bạn ước biết sớm hơn...",
    "Khoa học chứng minh: [Topic] thực sự hoạt động thế này...",
    "Nghiên cứu mới nhất về [Topic] sẽ khiến bạn sốc...",
    "Chuyên gia [Topic] tiết lộ: Đây là cách đúng...",
    "3 bước đơn giản để [Topic] mà ai cũng làm được...",
    "Làm theo cách này, [Topic] sẽ dễ như ăn bánh...",
    "Nhớ 3 điều này thôi là đủ master [Topic]...",
];

const OPINION_HOOKS: [&str; 18] = [
    "Phí tiền! Đừng bao giờ mua [Topic] này...",
    "Tỉnh táo lại đi! [Topic] không thần thánh như bạn nghĩ đâu.",
    "Ai khen [Topic] ngon là tui block luôn...",
    "Tranh cãi: [Topic] có thực sự đáng tiền?",
    "Phí X triệu vào [Topic] này? Tui nói thật nha...",
    "Đây mới là chân ái nè, đừng nghe lời quảng cáo...",
    "[Thing A] vs [Thing B] - Cái nào thực sự đáng tiền?",
    "Tui đã thử cả hai và đây là sự thật...",
    "Đừng mua [A] khi [B] tồn tại! Đây là lý do...",
    "So sánh thật 100%: [Topic A] hay [Topic B]?",
    "Một bên X triệu, một bên Y triệu - Chọn cái nào?",
    "Dùng thử 30 ngày và đây là verdict của tui...",
    "Đánh giá thật 100% sau khi dùng [Topic]...",
    "Tui mua [Topic] và đây là những điều họ không nói...",
    "Review không sugar coat: [Topic] có đáng không?",
    "Đỉnh hay Tệ? Sự thật về [Topic] sau 1 tháng dùng...",
    "Đáng đồng tiền bát gạo hay phí tiền? [Topic] review.",
    "Kết luận cuối cùng về [Topic] - Có nên mua?",
];

const TOPIC_PREVIEW_CHARS: usize = 20;

/// Up to `count` distinct hooks from the scenario's list, in random order.
pub fn random_hooks<R: Rng + ?Sized>(
    scenario: Scenario,
    count: usize,
    rng: &mut R,
) -> Vec<&'static str> {
    let mut hooks = scenario.hooks().to_vec();
    hooks.shuffle(rng);
    hooks.truncate(count.min(hooks.len()));
    hooks
}

/// Replace hook placeholders with the topic or neutral option labels.
pub fn fill_placeholders(hook: &str, topic: &str) -> String {
    let short_topic = if topic.chars().count() > TOPIC_PREVIEW_CHARS {
        let head: String = topic.chars().take(TOPIC_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        topic.to_string()
    };

    hook.replace("[Thing A]", "Option A")
        .replace("[Thing B]", "Option B")
        .replace("[Topic A]", "Option A")
        .replace("[Topic B]", "Option B")
        .replace("[A]", "A")
        .replace("[B]", "B")
        .replace("[Topic]", &short_topic)
}

/// Sample hooks for a scenario with placeholders filled for `topic`.
pub fn sample_hooks<R: Rng + ?Sized>(
    scenario: Scenario,
    topic: &str,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let hooks: Vec<String> = random_hooks(scenario, count, rng)
        .into_iter()
        .map(|hook| fill_placeholders(hook, topic))
        .collect();

    tracing::debug!(
        scenario = %scenario,
        requested = count,
        selected = hooks.len(),
        "Selected hook examples"
    );

    hooks
}
