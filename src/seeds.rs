//! Built-in content: weak-word dictionary, vocabulary bank, transition words,
//! fallback writing prompts and the lesson catalogue.
//!
//! Everything here is usable without configuration or an API key.

use crate::domain::{
  Activity, ActivityItem, ActivityKind, Difficulty, Lesson, TextType, VocabularyCategory, VocabularyWord,
};

/// Weak word -> stronger alternatives, in scan order.
pub fn weak_word_dictionary() -> Vec<(String, Vec<String>)> {
  let raw: [(&str, [&str; 5]); 10] = [
    ("good", ["excellent", "outstanding", "remarkable", "superb", "exceptional"]),
    ("bad", ["terrible", "awful", "dreadful", "appalling", "atrocious"]),
    ("nice", ["delightful", "pleasant", "wonderful", "charming", "lovely"]),
    ("big", ["enormous", "massive", "gigantic", "colossal", "immense"]),
    ("small", ["tiny", "minuscule", "petite", "compact", "diminutive"]),
    ("said", ["exclaimed", "declared", "announced", "whispered", "muttered"]),
    ("went", ["traveled", "journeyed", "ventured", "proceeded", "departed"]),
    ("got", ["obtained", "acquired", "received", "secured", "gained"]),
    ("very", ["extremely", "incredibly", "remarkably", "exceptionally", "tremendously"]),
    ("really", ["genuinely", "truly", "absolutely", "certainly", "definitely"]),
  ];
  raw
    .iter()
    .map(|(w, syns)| (w.to_string(), syns.iter().map(|s| s.to_string()).collect()))
    .collect()
}

fn word(
  word: &str,
  definition: &str,
  example: &str,
  difficulty: Difficulty,
  category: &str,
  synonyms: &[&str],
  usage_tip: Option<&str>,
) -> VocabularyWord {
  VocabularyWord {
    word: word.into(),
    definition: definition.into(),
    example: example.into(),
    difficulty,
    category: category.into(),
    synonyms: (!synonyms.is_empty()).then(|| synonyms.iter().map(|s| s.to_string()).collect()),
    usage_tip: usage_tip.map(str::to_string),
  }
}

pub fn vocabulary_bank() -> Vec<VocabularyCategory> {
  use Difficulty::*;
  const DESC: &str = "Descriptive Words";
  const ACTION: &str = "Action Words";
  const SOPH: &str = "Sophisticated Alternatives";
  vec![
    VocabularyCategory {
      category: DESC.into(),
      description: "Words to enhance descriptions and imagery".into(),
      words: vec![
        word("magnificent", "Extremely beautiful, elaborate, or impressive",
          "The magnificent sunset painted the sky in brilliant colors.", Advanced, DESC,
          &["splendid", "glorious", "superb"], Some("Use for describing something truly impressive")),
        word("serene", "Calm, peaceful, and untroubled",
          "The serene lake reflected the mountains perfectly.", Intermediate, DESC,
          &["tranquil", "peaceful", "calm"], Some("Perfect for describing peaceful scenes")),
        word("colossal", "Extremely large or great",
          "The colossal statue dominated the landscape.", Advanced, DESC,
          &["immense", "gigantic"], None),
        word("minuscule", "Extremely small",
          "The minuscule details were barely visible.", Advanced, DESC,
          &["tiny", "negligible"], None),
      ],
    },
    VocabularyCategory {
      category: ACTION.into(),
      description: "Dynamic verbs to make your writing more engaging".into(),
      words: vec![
        word("scrutinize", "To examine or inspect closely and thoroughly",
          "She scrutinized the document for any errors.", Advanced, ACTION,
          &["examine", "inspect", "analyze"], Some("Use when describing careful examination")),
        word("meander", "To follow a winding course or wander aimlessly",
          "The river meandered through the valley.", Intermediate, ACTION,
          &["wander", "wind", "snake"], Some("Great for describing movement or paths")),
        word("articulate", "To express clearly and effectively",
          "She articulated her concerns with precision.", Advanced, ACTION,
          &["express", "voice"], Some("A stronger choice than 'said' for considered speech")),
        word("proclaim", "To announce officially or publicly",
          "The leader proclaimed the new policy.", Intermediate, ACTION,
          &["announce", "declare"], None),
      ],
    },
    VocabularyCategory {
      category: SOPH.into(),
      description: "Stronger replacements for everyday words".into(),
      words: vec![
        word("exceptional", "Unusually good; outstanding",
          "The student demonstrated exceptional writing skills.", Advanced, SOPH, &["outstanding"], None),
        word("exemplary", "Serving as a desirable model; very good",
          "Her exemplary behavior inspired others.", Advanced, SOPH, &[], None),
        word("commendable", "Deserving praise",
          "His commendable effort was recognized by all.", Intermediate, SOPH, &[], None),
        word("detrimental", "Tending to cause harm",
          "The pollution had a detrimental effect on wildlife.", Advanced, SOPH, &["harmful"], None),
        word("deplorable", "Deserving strong condemnation",
          "The deplorable conditions needed immediate attention.", Advanced, SOPH, &[], None),
        word("substantial", "Of considerable importance, size, or worth",
          "There was substantial evidence to support the claim.", Intermediate, SOPH, &["considerable"], None),
        word("paramount", "Of the highest importance",
          "Safety is of paramount importance.", Advanced, SOPH, &["crucial", "significant"], None),
        word("modest", "Relatively moderate, limited, or small in amount",
          "She made a modest contribution to the project.", Basic, SOPH, &[], None),
      ],
    },
  ]
}

/// Transition-word families, keyed by the relation they express.
pub fn transition_words() -> Vec<(&'static str, Vec<&'static str>)> {
  vec![
    ("addition", vec!["furthermore", "moreover", "additionally", "consequently", "in addition", "similarly", "likewise", "equally important", "not only... but also"]),
    ("contrast", vec!["however", "nevertheless", "nonetheless", "conversely", "on the contrary", "in contrast", "alternatively", "whereas", "although", "despite"]),
    ("cause_effect", vec!["therefore", "consequently", "as a result", "thus", "hence", "accordingly", "for this reason", "due to", "because of"]),
    ("sequence", vec!["initially", "subsequently", "eventually", "ultimately", "meanwhile", "simultaneously", "previously", "following this", "in the meantime"]),
    ("emphasis", vec!["indeed", "certainly", "undoubtedly", "without question", "clearly", "obviously", "in fact", "particularly", "especially", "notably"]),
    ("conclusion", vec!["in conclusion", "ultimately", "in summary", "to summarize", "finally", "in essence", "overall", "to conclude", "in the final analysis"]),
  ]
}

/// Offline writing prompts per text type; narrative is the default pool.
pub fn fallback_prompts(text_type: Option<TextType>) -> &'static [&'static str] {
  match text_type {
    Some(TextType::Persuasive) => &[
      "Should students be allowed to choose their own school subjects? Write a persuasive piece arguing your position.",
      "Convince your school principal to introduce a new subject that you think would benefit all students.",
      "Should mobile phones be allowed in schools? Present your argument with strong evidence.",
      "Persuade your community to adopt a new environmental initiative.",
      "Argue for or against the idea that homework should be banned on weekends.",
    ],
    Some(TextType::Expository) => &[
      "Explain how social media has changed the way young people communicate and form friendships.",
      "Describe the process of how a book becomes a bestseller, from writing to publication.",
      "Explain why some people are naturally good at sports while others excel in academics.",
      "Describe how climate change affects different parts of the world.",
      "Explain the importance of preserving historical landmarks in your community.",
    ],
    Some(TextType::Informative) => &[
      "Inform readers about an important historical event and its impact on today's world.",
      "Explain how renewable energy sources work and why they're important for the future.",
      "Describe the process of how movies are made, from script to screen.",
      "Inform your audience about a scientific discovery that changed the world.",
      "Explain how different cultures celebrate the same holiday in unique ways.",
    ],
    Some(TextType::Creative) => &[
      "Write a piece that begins with: 'The last person on Earth sat alone in a room. There was a knock on the door...'",
      "Create a story told entirely through text messages between two characters.",
      "Write about a world where colors have personalities and can talk to humans.",
      "Imagine a day when gravity stops working for exactly one hour.",
      "Write about a character who can step into any photograph and experience that moment.",
    ],
    _ => &[
      "Write a story about a character who discovers a mysterious door in their school that leads to an unexpected place.",
      "Tell the story of a day when everything that could go wrong, did go wrong, but it led to something wonderful.",
      "Write about a character who finds an old diary and discovers it belongs to someone from 100 years ago.",
      "Create a story about a character who can hear what animals are thinking for one day.",
      "Write about a character who discovers they have a superpower, but it only works when they're helping others.",
    ],
  }
}

fn choice_items(options: &[&str], items: &[(&str, &[&str])]) -> Vec<ActivityItem> {
  items
    .iter()
    .map(|(prompt, answer)| ActivityItem {
      prompt: prompt.to_string(),
      options: options.iter().map(|o| o.to_string()).collect(),
      answer: answer.iter().map(|a| a.to_string()).collect(),
    })
    .collect()
}

fn sentence_structure_activities() -> Vec<Activity> {
  let types = ["Simple", "Compound", "Complex", "Compound-Complex"];
  vec![
    Activity {
      id: "identify-sentence-type".into(),
      title: "Identify the Sentence Type".into(),
      instructions: "Read each sentence and identify whether it is simple, compound, complex, or compound-complex.".into(),
      kind: ActivityKind::SingleChoice,
      items: choice_items(&types, &[
        ("The storm raged throughout the night.", &["Simple"]),
        ("The storm raged throughout the night, and many trees fell.", &["Compound"]),
        ("When the storm finally passed, the neighborhood was quiet.", &["Complex"]),
        ("When the storm finally passed, the neighborhood was quiet, but the damage was extensive.", &["Compound-Complex"]),
        ("The emergency services worked tirelessly throughout the night to clear the roads and restore power.", &["Simple"]),
      ]),
    },
    Activity {
      id: "sentence-transformation".into(),
      title: "Sentence Transformation".into(),
      instructions: "Rewrite each simple sentence as the sentence type shown.".into(),
      kind: ActivityKind::FreeText,
      items: vec![
        ActivityItem { prompt: "Transform into a compound sentence: The bell rang.".into(), options: vec![], answer: vec![] },
        ActivityItem { prompt: "Transform into a complex sentence: We stayed inside.".into(), options: vec![], answer: vec![] },
      ],
    },
  ]
}

fn peel_activities() -> Vec<Activity> {
  let sentences = ["Sentence 1", "Sentence 2", "Sentence 3", "Sentence 4", "Sentence 5"];
  vec![Activity {
    id: "identify-peel".into(),
    title: "Identify PEEL Components".into(),
    instructions: "(1) Technology has significantly improved education in modern classrooms. (2) Interactive whiteboards allow teachers to display multimedia content that engages visual learners. (3) Educational apps provide personalized learning experiences that adapt to each student's pace and level. (4) These technological tools help students understand complex concepts through visualization and interactive exercises, making learning more effective than traditional methods alone. (5) By incorporating technology thoughtfully, schools can create more dynamic and accessible learning environments for all students.".into(),
    kind: ActivityKind::MultiChoice,
    items: choice_items(&sentences, &[
      ("Which sentence is the Point (Topic Sentence)?", &["Sentence 1"]),
      ("Which sentences provide Evidence/Examples?", &["Sentence 2", "Sentence 3"]),
      ("Which sentence provides the Explanation?", &["Sentence 4"]),
      ("Which sentence is the Link?", &["Sentence 5"]),
    ]),
  }]
}

fn punctuation_activities() -> Vec<Activity> {
  let opts = |a: &str, b: &str, c: &str| [a.to_string(), b.to_string(), c.to_string()];
  let items = vec![
    (
      opts(
        "After the exam, we went to the cafe, ordered lunch and discussed our answers.",
        "After the exam we went to the cafe ordered lunch and discussed our answers.",
        "After the exam, we went to the cafe, ordered lunch, and discussed our answers.",
      ),
      vec![0usize, 2],
    ),
    (
      opts(
        "\"Have you finished your essay\" asked the teacher.",
        "\"Have you finished your essay?\" asked the teacher.",
        "\"Have you finished your essay\"? asked the teacher.",
      ),
      vec![1],
    ),
    (
      opts(
        "I need the following items for the project: scissors, glue, and colored paper.",
        "I need the following items for the project; scissors, glue, and colored paper.",
        "I need the following items for the project, scissors, glue, and colored paper.",
      ),
      vec![0],
    ),
    (
      opts(
        "The students' projects were displayed in the hall.",
        "The students projects' were displayed in the hall.",
        "The students projects were displayed in the hall.",
      ),
      vec![0],
    ),
    (
      opts(
        "Although it was raining we still went to the excursion.",
        "Although it was raining, we still went to the excursion.",
        "Although, it was raining we still went to the excursion.",
      ),
      vec![1],
    ),
  ];

  vec![
    Activity {
      id: "correct-punctuation".into(),
      title: "Identify the Correct Punctuation".into(),
      instructions: "Choose the correctly punctuated sentence in each group.".into(),
      kind: ActivityKind::SingleChoice,
      items: items
        .into_iter()
        .enumerate()
        .map(|(i, (options, correct))| ActivityItem {
          prompt: format!("Group {}", i + 1),
          answer: correct.iter().map(|&k| options[k].clone()).collect(),
          options: options.to_vec(),
        })
        .collect(),
    },
    Activity {
      id: "fix-punctuation".into(),
      title: "Fix the Punctuation Errors".into(),
      instructions: "Rewrite each sentence with correct punctuation.".into(),
      kind: ActivityKind::FreeText,
      items: [
        "The teacher said we need to bring our textbooks notebooks and calculators to class tomorrow",
        "Did you know that Sydney Australia is one of the most beautiful cities in the world",
        "When I arrived at school I realized I had forgotten my homework assignment at home",
        "Wow that was an amazing performance she exclaimed",
        "The museum has three sections ancient history modern art and interactive exhibits",
      ]
      .iter()
      .map(|p| ActivityItem { prompt: p.to_string(), options: vec![], answer: vec![] })
      .collect(),
    },
  ]
}

fn checklist_for(text_type: Option<TextType>) -> Vec<String> {
  let items: &[&str] = match text_type {
    Some(TextType::Narrative) => &[
      "My story has a clear orientation, complication and resolution",
      "My characters have clear motivations",
      "I used dialogue to move the story forward",
      "I showed feelings instead of telling them",
    ],
    Some(TextType::Persuasive) => &[
      "My position is clear in the introduction",
      "Each body paragraph follows PEEL",
      "I addressed a counter-argument",
      "My conclusion restates my position with a call to action",
    ],
    Some(TextType::Descriptive) => &[
      "I used at least three of the five senses",
      "I included figurative language (simile, metaphor, personification)",
      "My description has a clear spatial or logical order",
      "I chose precise, vivid vocabulary",
    ],
    _ => &[
      "I planned before writing",
      "My paragraphs each have one main idea",
      "I varied my sentence types",
      "I proofread for spelling and punctuation",
    ],
  };
  items.iter().map(|s| s.to_string()).collect()
}

/// The 30-day programme.
pub fn lesson_catalogue() -> Vec<Lesson> {
  use TextType::*;
  let outline: [(&str, &str, Option<TextType>); 30] = [
    ("assessment-criteria", "Understanding the Assessment Criteria", None),
    ("sentence-structure", "Sentence Structure", None),
    ("paragraph-building", "Paragraph Building with PEEL", Some(Persuasive)),
    ("basic-punctuation", "Basic Punctuation", None),
    ("descriptive-language", "Descriptive Language", Some(Descriptive)),
    ("narrative-structure", "Narrative Structure", Some(Narrative)),
    ("character-development", "Character Development", Some(Narrative)),
    ("setting-atmosphere", "Setting and Atmosphere", Some(Narrative)),
    ("dialogue-writing", "Dialogue Writing", Some(Narrative)),
    ("plot-development", "Plot Development", Some(Narrative)),
    ("show-dont-tell", "Show, Don't Tell", Some(Narrative)),
    ("persuasive-writing-basics", "Persuasive Writing Basics", Some(Persuasive)),
    ("persuasive-techniques", "Persuasive Techniques", Some(Persuasive)),
    ("persuasive-essay-structure", "Persuasive Essay Structure", Some(Persuasive)),
    ("persuasive-essay-practice", "Persuasive Essay Practice", Some(Persuasive)),
    ("descriptive-writing-basics", "Descriptive Writing Basics", Some(Descriptive)),
    ("setting-description", "Setting Description", Some(Descriptive)),
    ("character-description", "Character Description", Some(Descriptive)),
    ("sensory-details", "Sensory Details", Some(Descriptive)),
    ("advanced-imagery-techniques", "Advanced Imagery Techniques", Some(Descriptive)),
    ("metaphors-similes-mastery", "Metaphors and Similes Mastery", Some(Descriptive)),
    ("personification-anthropomorphism", "Personification and Anthropomorphism", Some(Descriptive)),
    ("creating-mood-tone", "Creating Mood and Tone", Some(Descriptive)),
    ("descriptive-writing-practice-exam", "Descriptive Writing Practice Exam", Some(Descriptive)),
    ("rhetorical-questions-appeals", "Rhetorical Questions and Appeals", Some(Persuasive)),
    ("counter-arguments-rebuttals", "Counter-Arguments and Rebuttals", Some(Persuasive)),
    ("persuasive-language-devices", "Persuasive Language Devices", Some(Persuasive)),
    ("formal-vs-informal-persuasion", "Formal vs Informal Persuasion", Some(Persuasive)),
    ("persuasive-speech-writing", "Persuasive Speech Writing", Some(Persuasive)),
    ("persuasive-writing-practice-exam", "Persuasive Writing Practice Exam", Some(Persuasive)),
  ];

  outline
    .iter()
    .enumerate()
    .map(|(i, (slug, title, text_type))| {
      let day = i as u32 + 1;
      let activities = match day {
        2 => sentence_structure_activities(),
        3 => peel_activities(),
        4 => punctuation_activities(),
        _ => Vec::new(),
      };
      let practice_prompts = match text_type {
        Some(_) => fallback_prompts(*text_type).iter().take(2).map(|p| p.to_string()).collect(),
        None => vec!["Write a paragraph about a memorable school event using at least three different sentence types.".into()],
      };
      Lesson {
        day,
        slug: slug.to_string(),
        title: title.to_string(),
        text_type: *text_type,
        overview: format!("Day {day}: {title}. Work through the activities, then complete the practice task and check it against the self-assessment list."),
        activities,
        practice_prompts,
        checklist: checklist_for(*text_type),
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dictionary_has_ten_words_with_five_synonyms() {
    let d = weak_word_dictionary();
    assert_eq!(d.len(), 10);
    assert!(d.iter().all(|(_, s)| s.len() == 5));
    assert_eq!(d[0].0, "good");
  }

  #[test]
  fn catalogue_covers_thirty_days_in_order() {
    let lessons = lesson_catalogue();
    assert_eq!(lessons.len(), 30);
    assert!(lessons.iter().enumerate().all(|(i, l)| l.day == i as u32 + 1));
    assert_eq!(lessons[2].activities[0].id, "identify-peel");
    assert!(lessons.iter().all(|l| !l.checklist.is_empty()));
  }

  #[test]
  fn punctuation_group_accepts_both_comma_styles() {
    let lessons = lesson_catalogue();
    let first = &lessons[3].activities[0].items[0];
    assert_eq!(first.answer.len(), 2);
    assert!(first.answer.iter().all(|a| first.options.contains(a)));
  }
}
