use std::sync::OnceLock;

use chat_types::{ToolArgs, ToolCall};
use regex::Regex;
use serde_json::{json, Value};

/// Keyword family a prompt falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCategory {
    Weather,
    Code,
    Search,
    Calculation,
    Image,
    Help,
}

impl MockCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Code => "code",
            Self::Search => "search",
            Self::Calculation => "calculation",
            Self::Image => "image",
            Self::Help => "help",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Weather => &["weather", "天气"],
            Self::Code => &["code", "component", "代码", "组件"],
            Self::Search => &["search", "搜索", "查找"],
            Self::Calculation => &["calculate", "math", "计算", "数学", "算"],
            Self::Image => &["image", "picture", "图片", "图像", "生成"],
            Self::Help => &[],
        }
    }
}

/// Ordered by precedence; the first matching family wins.
const MATCH_ORDER: [MockCategory; 5] = [
    MockCategory::Weather,
    MockCategory::Code,
    MockCategory::Search,
    MockCategory::Calculation,
    MockCategory::Image,
];

/// Canned assistant reply with the tool calls it pretends to have made.
#[derive(Debug, Clone, PartialEq)]
pub struct CannedResponse {
    pub category: MockCategory,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

fn digits_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\d+").expect("digit regex must compile"))
}

pub fn classify_prompt(user_text: &str) -> MockCategory {
    let lowered = user_text.to_lowercase();
    for category in MATCH_ORDER {
        let keyword_hit = category
            .keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword));
        let digit_hit = category == MockCategory::Calculation && digits_regex().is_match(&lowered);
        if keyword_hit || digit_hit {
            return category;
        }
    }
    MockCategory::Help
}

/// Picks the canned reply for `user_text`.
pub fn generate(user_text: &str) -> CannedResponse {
    let category = classify_prompt(user_text);
    let (content, tool_calls) = match category {
        MockCategory::Weather => (WEATHER_REPLY.to_string(), vec![weather_search()]),
        MockCategory::Code => (CODE_REPLY.to_string(), vec![write_file(), replace_line()]),
        MockCategory::Search => (SEARCH_REPLY.to_string(), vec![web_search()]),
        MockCategory::Calculation => (CALCULATION_REPLY.to_string(), vec![calculate()]),
        MockCategory::Image => (IMAGE_REPLY.to_string(), vec![generate_image()]),
        MockCategory::Help => (help_reply(user_text), Vec::new()),
    };

    CannedResponse {
        category,
        content,
        tool_calls,
    }
}

const WEATHER_REPLY: &str = "Based on the search results, here is today's forecast for Nanchang:\n\n\
Today (Sep 13): overcast, 27°C, light breeze under force 3\n\
Tomorrow (Sep 14): thunderstorms clearing to cloudy, 35°C/27°C\n\
Day after (Sep 15): cloudy, 35°C/28°C\n\n\
It stays warm with the occasional thunderstorm, so take an umbrella when you head out.";

const CODE_REPLY: &str = "I created a new React component and updated the related type \
definitions. The component is now part of the project and ready to use.";

const SEARCH_REPLY: &str = "Here is what I found about the new features in React 18:\n\n\
1. Automatic batching\n\
2. Concurrent rendering\n\
3. Suspense improvements\n\
4. New hooks such as useId and useDeferredValue\n\n\
Together these noticeably improve performance and user experience.";

const CALCULATION_REPLY: &str = "I evaluated (100 + 50) * 0.8 - 15 step by step:\n\n\
1. 100 + 50 = 150\n\
2. 150 * 0.8 = 120\n\
3. 120 - 15 = 105\n\n\
The final result is 105.";

const IMAGE_REPLY: &str = "I generated a high resolution picture of a sunset over the \
mountains in golden colors and saved it to the project's assets folder.";

fn help_reply(user_text: &str) -> String {
    format!(
        "Hello! I'm your AI assistant. The backend is currently unavailable, so I'm answering with demo data.\n\n\
You said: \"{user_text}\"\n\n\
I can show you these kinds of replies:\n\
- Weather lookups (try \"what's the weather today\")\n\
- Code generation (try \"create a component for me\")\n\
- Web search (try \"search for React features\")\n\
- Calculations (try \"calculate 100+50\")\n\
- Image generation (try \"generate an image\")\n\n\
Once the service is reachable again, replies come from the real agents."
    )
}

fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        _ => ToolArgs::new(),
    }
}

fn weather_search() -> ToolCall {
    ToolCall::new(
        "tool_weather_001",
        "Search the internet with Serper",
        args(json!({ "search_query": "Nanchang weather today" })),
    )
    .completed(json!({
        "searchParameters": { "q": "Nanchang weather today", "type": "search", "num": 10, "engine": "google" },
        "organic": [
            {
                "title": "Nanchang - China Meteorological Administration city forecast",
                "link": "https://weather.cma.cn/web/weather/58606.html",
                "snippet": "Sat 09/13 35℃ 27℃; Sun 09/14 34℃ 27℃; Mon 09/15 35℃ 28℃",
                "position": 1
            },
            {
                "title": "Forecast - Nanchang",
                "link": "https://www.weather.com.cn/weather/101240101.shtml",
                "snippet": "13th (today) overcast 27℃ <force 3; 14th (tomorrow) thunderstorms then cloudy 35℃/27℃",
                "position": 2
            }
        ],
        "credits": 1
    }))
}

fn write_file() -> ToolCall {
    ToolCall::new(
        "tool_code_001",
        "lov-write",
        args(json!({
            "file_path": "src/components/Example.tsx",
            "content": "import React from \"react\";\n\nconst Example = () => {\n  return <div>Hello World</div>;\n};\n\nexport default Example;"
        })),
    )
    .completed("Success.")
}

fn replace_line() -> ToolCall {
    ToolCall::new(
        "tool_code_002",
        "lov-line-replace",
        args(json!({
            "file_path": "src/App.tsx",
            "search": "const App = () => {",
            "replace": "const App: React.FC = () => {",
            "first_replaced_line": 11,
            "last_replaced_line": 11
        })),
    )
    .completed("Success.")
}

fn web_search() -> ToolCall {
    ToolCall::new(
        "tool_search_001",
        "websearch--web_search",
        args(json!({ "query": "React 18 new features", "numResults": 5 })),
    )
    .completed(json!({
        "searchParameters": { "q": "React 18 new features", "type": "search" },
        "organic": [
            {
                "title": "React 18: What's New and Changed",
                "link": "https://blog.logrocket.com/react-18-new-features/",
                "snippet": "React 18 introduces automatic batching, concurrent rendering, and Suspense improvements..."
            },
            {
                "title": "React v18.0 – React Blog",
                "link": "https://reactjs.org/blog/2022/03/29/react-v18.html",
                "snippet": "Today we are excited to announce the release of React 18!"
            }
        ]
    }))
}

fn calculate() -> ToolCall {
    ToolCall::new(
        "tool_calc_001",
        "calculate",
        args(json!({ "expression": "(100 + 50) * 0.8 - 15", "operation": "complex_math" })),
    )
    .completed(json!({
        "result": 105,
        "steps": ["100 + 50 = 150", "150 * 0.8 = 120", "120 - 15 = 105"]
    }))
}

fn generate_image() -> ToolCall {
    ToolCall::new(
        "tool_image_001",
        "imagegen--generate_image",
        args(json!({
            "prompt": "A beautiful sunset over mountains with golden colors, ultra high resolution",
            "target_path": "src/assets/sunset-mountains.jpg",
            "width": 1024,
            "height": 768,
            "model": "flux.dev"
        })),
    )
    .completed("Image successfully generated and saved to src/assets/sunset-mountains.jpg")
}

#[cfg(test)]
mod tests {
    use chat_types::ToolCallStatus;

    use super::*;

    #[test]
    fn keywords_select_categories_in_precedence_order() {
        assert_eq!(classify_prompt("What's the WEATHER like?"), MockCategory::Weather);
        assert_eq!(classify_prompt("今天天气怎么样"), MockCategory::Weather);
        assert_eq!(classify_prompt("write a component"), MockCategory::Code);
        assert_eq!(classify_prompt("search the code base"), MockCategory::Code);
        assert_eq!(classify_prompt("帮我搜索"), MockCategory::Search);
        assert_eq!(classify_prompt("what is 12 plus 30"), MockCategory::Calculation);
        assert_eq!(classify_prompt("draw an image"), MockCategory::Image);
        assert_eq!(classify_prompt("hello there"), MockCategory::Help);
    }

    #[test]
    fn canned_tool_calls_are_completed_with_results() {
        for prompt in ["weather", "code", "search", "calculate", "image"] {
            let response = generate(prompt);
            assert!(!response.tool_calls.is_empty(), "{prompt}");
            for call in &response.tool_calls {
                assert_eq!(call.status, ToolCallStatus::Completed);
                assert!(call.result.is_some());
                assert!(!call.args.is_empty());
            }
        }
    }

    #[test]
    fn help_reply_echoes_user_text_without_tools() {
        let response = generate("tell me a story");

        assert_eq!(response.category, MockCategory::Help);
        assert!(response.tool_calls.is_empty());
        assert!(response.content.contains("\"tell me a story\""));
    }
}
