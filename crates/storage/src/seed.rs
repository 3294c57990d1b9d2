//! Sample catalog used by the driver and by tests.

use exam_core::model::{Difficulty, LocalizedText, MockTest, Question, QuestionDraft, Section};

const DIFFICULTY_CYCLE: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

/// Differentiation drill: f(x) = x² + ix + (i+1), answer f'(1) = 2 + i. Option `a` is correct.
fn derivative_question(prefix: &str, i: u32) -> Result<Question, exam_core::Error> {
    let n = i + 1;
    let option = |value: u32| LocalizedText::new(value.to_string());
    let question = QuestionDraft::new(
        format!("{prefix}-q{n}"),
        LocalizedText::new(format!(
            "Sample question {n}: If f(x) = x² + {i}x + {n}, find f'(1)."
        ))
        .with_hindi(format!(
            "नमूना प्रश्न {n}: यदि f(x) = x² + {i}x + {n}, तो f'(1) ज्ञात करें।"
        )),
    )
    .option("a", option(2 + i), true)
    .option("b", option(3 + i), false)
    .option("c", option(1 + i), false)
    .option("d", option(4 + i), false)
    .explanation(
        LocalizedText::new(format!("f'(x) = 2x + {i}, so f'(1) = 2 + {i} = {}", 2 + i))
            .with_hindi(format!("f'(x) = 2x + {i}, इसलिए f'(1) = 2 + {i} = {}", 2 + i)),
    )
    .marks(4, 1)
    .difficulty(DIFFICULTY_CYCLE[(i % 3) as usize])
    .topic("calculus", "differentiation")
    .validate()?;
    Ok(question)
}

fn section(
    prefix: &str,
    id: &str,
    name: LocalizedText,
    count: u32,
) -> Result<Section, exam_core::Error> {
    let section_id = format!("{prefix}-{id}");
    let questions = (0..count)
        .map(|i| derivative_question(&section_id, i))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Section::new(section_id, name, questions))
}

fn maths() -> LocalizedText {
    LocalizedText::new("Mathematics").with_hindi("गणित")
}

/// The four tests offered by the mock-test list screen.
///
/// # Errors
///
/// Returns `exam_core::Error` if any generated question or test fails validation.
pub fn sample_catalog() -> Result<Vec<MockTest>, exam_core::Error> {
    let main_1 = MockTest::new(
        "mock-1",
        LocalizedText::new("JEE Main Mock Test 1").with_hindi("JEE मुख्य मॉक टेस्ट 1"),
        vec![section("mock-1", "maths", maths(), 25)?],
        60 * 60,
        Difficulty::Medium,
    )?;

    let main_2 = MockTest::new(
        "mock-2",
        LocalizedText::new("JEE Main Mock Test 2").with_hindi("JEE मुख्य मॉक टेस्ट 2"),
        vec![
            section(
                "mock-2",
                "calculus",
                LocalizedText::new("Calculus").with_hindi("कलन"),
                13,
            )?,
            section(
                "mock-2",
                "algebra",
                LocalizedText::new("Algebra").with_hindi("बीजगणित"),
                12,
            )?,
        ],
        60 * 60,
        Difficulty::Medium,
    )?;

    let advanced = MockTest::new(
        "mock-3",
        LocalizedText::new("JEE Advanced Mock Test 1").with_hindi("JEE एडवांस्ड मॉक टेस्ट 1"),
        vec![section("mock-3", "maths", maths(), 30)?],
        90 * 60,
        Difficulty::Hard,
    )?;

    let quick = MockTest::new(
        "mock-4",
        LocalizedText::new("Quick Practice Test").with_hindi("त्वरित अभ्यास परीक्षा"),
        vec![section("mock-4", "maths", maths(), 15)?],
        30 * 60,
        Difficulty::Easy,
    )?;

    Ok(vec![main_1, main_2, advanced, quick])
}
