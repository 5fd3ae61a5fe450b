use crate::entities::RawMovieRecord;

pub const SYSTEM_INSTRUCTION: &str = "You are a precise JSON formatter. Reply with a single valid JSON array and nothing else: no prose, no markdown. Titles must be clean and properly formatted.";

const TARGET_SHAPE: &str = r#"{
  "rank": 1,
  "title": "Clean Movie Title",
  "release_year": 1997,
  "imdb_rating": 7.3,
  "runtime": "138 min",
  "genres": ["Action", "Crime"],
  "imdb_url": "https://www.imdb.com/title/tt0119094/"
}"#;

const RULES: &[&str] = &[
    "Return exactly one object per movie, in the order given; never drop, merge or reorder movies.",
    "Keep each movie's rank number exactly as given.",
    "Remove leading list numbering or symbols from titles (\"12. Mandy\" becomes \"Mandy\").",
    "release_year must be an integer, or null when the year is \"N/A\" or not a number.",
    "imdb_rating must be a number between 0 and 10, or null when it is \"N/A\" or not a number.",
    "Split comma-separated genre text into a list of genres; use [] when the genre is \"N/A\".",
    "Any other field whose value is \"N/A\" must be null, never the string \"N/A\".",
];

/// User prompt for one batch: the raw fields, the target shape and the rules.
pub fn build_prompt(batch: &[RawMovieRecord]) -> String {
    let mut prompt = String::from("Convert the movie data below into a JSON array.\n\nMOVIE DATA:\n\n");

    for movie in batch {
        prompt.push_str(&format!(
            "Rank: {}\nTitle: {}\nYear: {}\nRating: {}\nRuntime: {}\nGenre: {}\nURL: {}\n---\n",
            movie.raw_rank,
            movie.raw_title,
            movie.raw_year,
            movie.raw_rating,
            movie.raw_runtime,
            movie.raw_genre,
            movie.raw_url,
        ));
    }

    prompt.push_str(&format!(
        "\nEach movie must have exactly this shape:\n{TARGET_SHAPE}\n\nRules:\n"
    ));
    for (i, rule) in RULES.iter().enumerate() {
        prompt.push_str(&format!("{}. {rule}\n", i + 1));
    }
    prompt.push_str(&format!(
        "\nReturn a JSON array of {} movie objects.",
        batch.len()
    ));

    prompt
}
