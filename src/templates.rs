//! Built-in prompt starters offered on an empty thread.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
    pub category: &'static str,
}

/// Category that selects every template.
pub const ALL_CATEGORY: &str = "all";

const CATEGORIES: [&str; 5] = [ALL_CATEGORY, "software", "hardware", "testing", "database"];

const TEMPLATES: [PromptTemplate; 12] = [
    PromptTemplate {
        id: "code-explain",
        title: "Explain code",
        description: "Understand what a piece of code does",
        prompt: "Please analyze this code and explain what it does and how it works",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "code-generate",
        title: "Generate code",
        description: "Produce working code from a description",
        prompt: "Please write code that meets these requirements: ",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "code-optimize",
        title: "Optimize code",
        description: "Make code faster and easier to read",
        prompt: "Please optimize this code for performance and readability",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "debug",
        title: "Debug",
        description: "Track down hidden defects",
        prompt: "Please find the problems in this code and suggest how to debug them",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "regex",
        title: "Regular expression",
        description: "Build a pattern that matches text",
        prompt: "Please write a regular expression that matches: ",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "hardware",
        title: "Hardware development",
        description: "Answers for hardware questions",
        prompt: "Please help with this hardware development question: ",
        category: "hardware",
    },
    PromptTemplate {
        id: "consulting",
        title: "Consulting",
        description: "Advice from a domain expert",
        prompt: "Please give me professional technical advice on: ",
        category: ALL_CATEGORY,
    },
    PromptTemplate {
        id: "driver",
        title: "Device driver",
        description: "Write driver code for hardware",
        prompt: "Please help me develop a device driver. Requirements: ",
        category: "hardware",
    },
    PromptTemplate {
        id: "low-level",
        title: "Low-power design",
        description: "Reduce the power draw of firmware",
        prompt: "Please help me design a low-power approach for: ",
        category: "hardware",
    },
    PromptTemplate {
        id: "software-test",
        title: "Software testing",
        description: "Plan tests for software",
        prompt: "Please design a software test plan for: ",
        category: "testing",
    },
    PromptTemplate {
        id: "hardware-test",
        title: "Hardware testing",
        description: "Plan tests for hardware",
        prompt: "Please design a hardware test plan for: ",
        category: "testing",
    },
    PromptTemplate {
        id: "test-script",
        title: "Test script",
        description: "Generate executable test code",
        prompt: "Please generate a test script for: ",
        category: "testing",
    },
];

pub fn templates() -> &'static [PromptTemplate] {
    &TEMPLATES
}

pub fn categories() -> &'static [&'static str] {
    &CATEGORIES
}

pub fn find_template(id: &str) -> Option<&'static PromptTemplate> {
    TEMPLATES.iter().find(|template| template.id == id)
}

/// Templates filed under `category`; [`ALL_CATEGORY`] returns every one.
pub fn templates_in(category: &str) -> Vec<&'static PromptTemplate> {
    if category == ALL_CATEGORY {
        return TEMPLATES.iter().collect();
    }
    TEMPLATES
        .iter()
        .filter(|template| template.category == category)
        .collect()
}
