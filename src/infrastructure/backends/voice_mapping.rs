/// Check if a Polly voice supports the neural engine.
pub fn is_voice_neural_compatible(voice: &str) -> bool {
    // List of voices that support neural engine
    // Based on AWS Polly documentation
    const NEURAL_VOICES: &[&str] = &[
        // English
        "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
        "Amy", "Emma", "Brian", "Arthur", // Spanish
        "Lupe", "Pedro", "Sergio", // French
        "Lea", "Remi", // German
        "Vicki", "Daniel", // Italian
        "Bianca", "Adriano", // Portuguese
        "Ines", "Camila", "Vitoria", "Thiago", // Japanese
        "Takumi", "Kazuha", "Tomoko", // Korean
        "Seoyeon", // Mandarin Chinese
        "Zhiyu", // Arabic
        "Hala", "Zayd",
    ];

    NEURAL_VOICES.contains(&voice)
}
