//! The portfolio content, declared once as a literal.

use super::content::{
    Align, Block, ContentTree, Marker, Paragraph, ParagraphRole, Run, Section, SectionLayout,
};
use super::style::Tone;

const LINKEDIN: &str = "LinkedIn: linkedin.com/in/namil-kim-a59951123";
const GITHUB: &str = "GitHub: github.com/NAM-IL";

/// (name, proficiency, description)
type Skill = (&'static str, &'static str, &'static str);

const BACKEND: &[Skill] = &[
    ("Java", "90%", "객체지향 프로그래밍, 멀티스레딩"),
    ("Spring Framework", "90%", "MVC, Security, Data JPA"),
    ("Spring Boot", "85%", "마이크로서비스 아키텍처"),
    ("Spring AI", "80%", "AI 통합 및 LLM 연동"),
    ("JSP/Servlet", "85%", "웹 애플리케이션 개발"),
    ("MyBatis", "85%", "데이터베이스 매핑"),
    ("Python", "80%", "스크립팅 및 자동화"),
];

const FRONTEND_MOBILE: &[Skill] = &[
    ("HTML5/CSS3", "90%", "반응형 웹 디자인"),
    ("Bootstrap", "85%", "UI 프레임워크"),
    ("JavaScript/jQuery", "85%", "동적 웹 개발"),
    ("Flutter/Dart", "85%", "크로스 플랫폼 개발"),
    ("Android/Java & Kotlin", "90%", "네이티브 앱 개발"),
    ("iOS/Swift & SwiftUI", "80%", "iOS 앱 개발"),
    ("Python", "80%", "모바일 자동화"),
];

const DATABASE_TOOLS: &[Skill] = &[
    ("Oracle", "85%", "엔터프라이즈 데이터베이스"),
    ("Git/GitHub & GitLab & Bitbucket", "85%", "버전 관리"),
    ("CI/CD (Jenkins)", "75%", "지속적 통합/배포"),
    ("Docker", "80%", "컨테이너화"),
    ("Figma", "80%", "UI/UX 디자인"),
];

struct Engagement {
    company: &'static str,
    project: &'static str,
    period: &'static str,
    work: &'static [&'static str],
    tech: &'static str,
}

const ENGAGEMENTS: &[Engagement] = &[
    Engagement {
        company: "우리은행",
        project: "WON뱅킹 Re-Modeling",
        period: "2022.07 - 2023.07 (12개월)",
        work: &[
            "우리은행 개인비대면 채널 Re-Modeling 추진사업",
            "만보기 기능 추가",
            "이체기능 네이티브 → 웹 서비스 전환",
            "로컬 CI/CD 환경 구축",
        ],
        tech: "Android, Java, Kotlin, WebView, CI/CD",
    },
    Engagement {
        company: "신한은행",
        project: "땡겨요 O2O 플랫폼",
        period: "2021.10 - 2022.02 (5개월)",
        work: &[
            "음식주문중개 O2O 플랫폼 구축",
            "Pull refresh 확장기능 개발",
            "땡기기 기능 구현",
            "WebView 설계 및 구현",
            "Docker를 이용한 암호화/빌드 시스템 관리",
        ],
        tech: "Android, Java, Docker, WebView",
    },
    Engagement {
        company: "KB 국민카드",
        project: "MyData 플랫폼",
        period: "2021.04 - 2021.08 (5개월)",
        work: &[
            "KB 국민카드 표준API기반 MyData 플랫폼 개편 프로젝트",
            "표준API기반 MyData 기능 적용",
            "전체메뉴 > 메뉴검색 기능 추가",
        ],
        tech: "Android, Java, RESTful API",
    },
    Engagement {
        company: "하나은행",
        project: "Line Bank Indonesia",
        period: "2020.08 - 2021.03 (8개월)",
        work: &[
            "인도네시아 하나은행 Linebank 앱 개발",
            "MVVM 패턴 설계 및 구현",
            "보안 키패드 이슈 해결",
            "Django & Bootstrap을 활용한 내부용 앱 배포 사이트 구축",
        ],
        tech: "Android, Java, MVVM, Django, Bootstrap",
    },
    Engagement {
        company: "KB국민은행",
        project: "마이머니 App 고도화",
        period: "2019.08 - 2019.11 (4개월)",
        work: &[
            "KB국민은행 마이머니 Android App 고도화 작업",
            "안드로이드 네이티브 앱 개발",
            "인트로 화면/프로그레스바 고도화",
            "지문인증 솔루션 업데이트",
            "androidX 컨버팅",
        ],
        tech: "Android, Java, AndroidX",
    },
    Engagement {
        company: "키움증권",
        project: "영웅문S MTS 개발",
        period: "2018.05 - 2018.12 (8개월)",
        work: &[
            "키움증권 영웅문S MTS 고도화 프로젝트",
            "관심종목 C++ 공통 플랫폼 개발",
            "Javascript를 이용한 MTS 화면개발",
        ],
        tech: "C++, JavaScript, WebView",
    },
];

/// Engagements shown per slide.
const ENGAGEMENTS_PER_SLIDE: usize = 2;

struct Project {
    name: &'static str,
    summary: &'static str,
    period: &'static str,
    features: &'static [&'static str],
    tech: &'static str,
    notes_label: &'static str,
    notes: &'static [&'static str],
}

const PROJECTS: &[Project] = &[
    Project {
        name: "Miracle Reading System",
        summary: "독서 습관 형성과 도서 관리를 위한 종합적인 웹 애플리케이션",
        period: "2025.11.10 - 2025.12.10 (1개월)",
        features: &[
            "사용자 인증 및 관리 (폼 로그인, OAuth2)",
            "도서 관리 시스템 (알라딘 API 연동)",
            "AI 기반 도서 요약 (Spring AI + Ollama)",
            "독서 계획 및 기록 관리",
            "속독 훈련 기능",
            "갤러리 및 소셜 기능 (좋아요, 댓글)",
            "마인드맵 기능",
            "관리자 콘솔",
        ],
        tech: "Java 17, Spring Boot 3.3.5, Spring AI, Oracle 23 AI, JSP, Bootstrap 5, jQuery, Docker, Ollama (Qwen3:1.7b)",
        notes_label: "주요 성과:",
        notes: &[
            "AI 통합: Spring AI를 활용한 로컬 LLM 연동",
            "확장 가능한 아키텍처: 계층형 구조 설계",
            "다중 인증 시스템: 폼 로그인 + OAuth2 통합",
        ],
    },
    Project {
        name: "Productivity Hub",
        summary: "Flutter 기반의 통합 생산성 앱",
        period: "2025.12.04 오후 (4시간)",
        features: &[
            "할 일 관리 (Todo) - 추가/수정/삭제, 완료 상태 토글",
            "아이디어 기록 - 카테고리별 아이디어 관리",
            "독서 카드 - 독서 진행 관리, 키워드/요약 기록",
            "날씨 정보 - 현재 위치 및 도시별 날씨 조회",
            "뉴스 피드 - AI/양자컴퓨팅 관련 최신 뉴스",
        ],
        tech: "Flutter 3.x, Dart, Provider, SQLite, Open-Meteo API, RSS Feed, Geolocator",
        notes_label: "아키텍처:",
        notes: &[
            "Provider 패턴 (MVVM 기반) 상태 관리",
            "SQLite 로컬 데이터 저장",
            "RESTful API 연동 (날씨, 뉴스)",
            "반응형 UI 디자인",
        ],
    },
];

/// (course, institution, period, hours)
const COURSES: &[(&str, &str, &str, &str)] = &[
    (
        "Spring Framework 기반 Java Full-Stack 개발자 양성과정",
        "쌍용강북교육센터",
        "2025.05.12 - 2025.11.12",
        "944시간",
    ),
    (
        "소음진동평가모니터링시스템개발 과정",
        "경영기술개발원교육센터",
        "2012.06 - 2012.12",
        "960시간",
    ),
    (
        "임베디드 SW 전문가 과정",
        "한국정보기술연구원",
        "2007.10 - 2008.03",
        "960시간",
    ),
];

const CERTIFICATIONS: &[(&str, &str)] = &[
    ("정보처리기사", "2025.09"),
    ("RFID-GL", "2013.11"),
    ("SCJP", "2010.04"),
    ("전기공사", "2004.08"),
];

const SMALL_GAP: f32 = 7.2;
const GAP: f32 = 14.4;
const COVER_GAP: f32 = 21.6;

/// The complete portfolio.
pub fn portfolio() -> ContentTree {
    ContentTree::new("Portfolio")
        .with_author("Namil Kim")
        .with_language("ko-KR")
        .with_section(cover())
        .with_section(about())
        .with_section(skills())
        .with_section(experience())
        .with_section(projects())
        .with_section(education())
        .with_section(competencies())
        .with_section(contact())
}

fn label(text: &str) -> Block {
    Block::paragraph(Paragraph::new(vec![Run::bold(text)]))
}

fn dots<'a>(level: u8, items: &'a [&'a str]) -> impl Iterator<Item = Block> + 'a {
    items.iter().map(move |s| Block::bullet(level, Marker::Dot, *s))
}

fn checks<'a>(level: u8, items: &'a [&'a str]) -> impl Iterator<Item = Block> + 'a {
    items.iter().map(move |s| Block::bullet(level, Marker::Check, *s))
}

fn tech_stack(tech: &str) -> Block {
    Block::paragraph(Paragraph::new(vec![
        Run::italic(format!("기술 스택: {tech}")).with_tone(Tone::Accent),
    ]))
}

fn skill_group(title: &str, skills: &[Skill], highlights: &[&str]) -> Vec<Block> {
    let mut blocks = vec![Block::heading(2, title)];
    blocks.extend(skills.iter().map(|(name, level, desc)| {
        Block::bullet_runs(
            0,
            Marker::Dot,
            vec![Run::bold(*name), Run::plain(format!(" ({level}) - {desc}"))],
        )
    }));
    blocks.push(Block::Spacer(SMALL_GAP));
    blocks.push(label("주요 경험:"));
    blocks.extend(checks(0, highlights));
    blocks
}

fn cover() -> Section {
    let subtitle = |text: &str| {
        Block::paragraph(
            Paragraph::plain(text)
                .with_align(Align::Center)
                .with_role(ParagraphRole::Subtitle),
        )
    };
    Section::new("Portfolio")
        .with_layout(SectionLayout::Title)
        .push(Block::Spacer(COVER_GAP))
        .push(subtitle("Full-Stack Developer"))
        .push(subtitle("Java • Spring Framework • Flutter • Mobile Development"))
        .push(Block::PageBreak)
}

fn about() -> Section {
    Section::new("About Me")
        .push(Block::paragraph(
            Paragraph::new(vec![Run::bold("Full-Stack 개발자")]).with_role(ParagraphRole::Lead),
        ))
        .push(Block::Spacer(GAP))
        .push(label("전문 분야:"))
        .extend(dots(
            0,
            &[
                "Java, Spring Framework, Flutter 등 다양한 기술 스택을 활용한 웹 및 모바일 애플리케이션 개발",
                "우리은행, 신한은행, KB국민카드 등 금융권 프로젝트 경험",
                "안드로이드 네이티브 앱 개발부터 백엔드 서버 개발까지 전반적인 개발 역량",
            ],
        ))
        .push(Block::Spacer(SMALL_GAP))
        .push(label("주요 통계:"))
        .extend(checks(
            0,
            &["15+ 프로젝트 완료", "6+ 년 프리랜서 경력", "4개 자격증 보유"],
        ))
        .push(Block::Spacer(SMALL_GAP))
        .push(Block::text(
            "지속적인 학습과 성장을 통해 더 나은 개발자가 되기 위해 노력하고 있으며, \
             최근에는 Spring Framework 기반 Java Full-Stack 개발자 양성과정을 수료하여 \
             최신 기술을 습득했습니다.",
        ))
        .push(Block::PageBreak)
}

fn skills() -> Section {
    Section::new("Technical Skills")
        .push(Block::slide("Technical Skills - Backend"))
        .extend(skill_group(
            "Backend",
            BACKEND,
            &[
                "RESTful API 설계 및 구현",
                "Spring Security 기반 인증/인가 시스템",
                "OAuth2 소셜 로그인 통합",
                "Spring AI를 활용한 AI 기능 구현",
            ],
        ))
        .push(Block::slide("Technical Skills - Frontend & Mobile"))
        .push(Block::Spacer(GAP))
        .extend(skill_group(
            "Frontend & Mobile",
            FRONTEND_MOBILE,
            &[
                "Flutter 기반 크로스 플랫폼 앱 개발",
                "Android 네이티브 앱 개발 (금융권 프로젝트)",
                "iOS 앱 개발 및 배포",
                "반응형 웹 애플리케이션 개발",
            ],
        ))
        .push(Block::slide("Technical Skills - Database & Tools"))
        .push(Block::Spacer(GAP))
        .extend(skill_group(
            "Database & Tools",
            DATABASE_TOOLS,
            &[
                "Oracle 23 AI 데이터베이스 설계 및 최적화",
                "Git 기반 협업 및 코드 리뷰",
                "Docker를 활용한 컨테이너화 및 배포",
                "CI/CD 파이프라인 구축 및 관리",
            ],
        ))
        .push(Block::PageBreak)
}

fn experience() -> Section {
    let pages = ENGAGEMENTS.len().div_ceil(ENGAGEMENTS_PER_SLIDE);
    let mut section = Section::new("Key Experience");
    for (i, engagement) in ENGAGEMENTS.iter().enumerate() {
        if i % ENGAGEMENTS_PER_SLIDE == 0 {
            let page = i / ENGAGEMENTS_PER_SLIDE + 1;
            section = section.push(Block::slide(format!("Key Experience ({page}/{pages})")));
        }
        section = section
            .push(Block::heading(
                2,
                format!("{} - {}", engagement.company, engagement.project),
            ))
            .push(Block::paragraph(Paragraph::new(vec![
                Run::bold(engagement.period).with_tone(Tone::Secondary),
            ])))
            .push(label("프로젝트 내용:"))
            .extend(dots(0, engagement.work))
            .push(tech_stack(engagement.tech))
            .push(Block::Spacer(GAP));
    }
    section.push(Block::PageBreak)
}

fn projects() -> Section {
    let mut section = Section::new("Featured Projects");
    for (i, project) in PROJECTS.iter().enumerate() {
        if i > 0 {
            section = section.push(Block::Spacer(GAP));
        }
        section = section
            .push(Block::slide(format!("Featured Project - {}", project.name)))
            .push(Block::heading(2, project.name))
            .push(Block::text(format!("프로젝트 개요: {}", project.summary)))
            .push(Block::paragraph(Paragraph::new(vec![
                Run::bold("개발 기간:"),
                Run::plain(format!(" {}", project.period)),
            ])))
            .push(Block::text("개발 형태: 개인 프로젝트 (1인 총괄 개발)"))
            .push(label("주요 기능:"))
            .extend(checks(0, project.features))
            .push(tech_stack(project.tech))
            .push(label(project.notes_label))
            .extend(dots(0, project.notes));
    }
    section.push(Block::PageBreak)
}

fn education() -> Section {
    let mut section = Section::new("Education & Certifications")
        .push(Block::heading(2, "학위"))
        .push(Block::bullet_runs(
            0,
            Marker::Dot,
            vec![
                Run::bold("석사"),
                Run::plain(" - 광주과학기술원 기전공학과 (2005.03 ~ 2007.08)"),
            ],
        ))
        .push(Block::bullet_runs(
            0,
            Marker::Dot,
            vec![
                Run::bold("학사"),
                Run::plain(" - 강원대학교 전기전자공학과 (1995.03 ~ 2004.02)"),
            ],
        ))
        .push(Block::Spacer(GAP))
        .push(Block::heading(2, "교육 이력"));

    for (course, institution, period, hours) in COURSES {
        section = section
            .push(Block::bullet_runs(0, Marker::Dot, vec![Run::bold(*course)]))
            .push(Block::bullet(
                1,
                Marker::None,
                format!("{institution} ({period}, {hours})"),
            ));
    }

    section = section
        .push(Block::Spacer(GAP))
        .push(Block::heading(2, "자격증"))
        .extend(
            CERTIFICATIONS
                .iter()
                .map(|(name, date)| Block::bullet(0, Marker::Check, format!("{name} ({date})"))),
        );

    section
        .push(Block::Spacer(GAP))
        .push(Block::heading(2, "해외 경험"))
        .push(Block::bullet_runs(
            0,
            Marker::None,
            vec![
                Run::bold("산업인력공단 월드잡 연수 프로그램"),
                Run::plain(" (2010.07 ~ 2011.05)"),
            ],
        ))
        .extend(dots(
            1,
            &[
                "Canadagate IT 비즈니스 실무 과정 참여",
                "레벨테스트 후 Advanced 과정(Toefl) 수업 약 4개월 수강",
                "현지영어기술습득과 잠재능력 활용을 위한 자기계발",
                "미국, 캐나다 Brain-based Speed Reading 세미나 참석",
            ],
        ))
        .push(Block::PageBreak)
}

fn competencies() -> Section {
    Section::new("Core Competencies")
        .push(Block::heading(2, "기술 역량"))
        .push(label("Full-Stack Development:"))
        .extend(dots(
            0,
            &[
                "Backend: Java, Spring Framework, Spring Boot, Spring AI",
                "Frontend: HTML5/CSS3, JavaScript, jQuery, Bootstrap",
                "Mobile: Android (Java/Kotlin), iOS (Swift/SwiftUI), Flutter",
                "Database: Oracle, SQLite",
                "DevOps: Git, Docker, CI/CD (Jenkins)",
            ],
        ))
        .push(Block::Spacer(GAP))
        .push(Block::heading(2, "프로젝트 경험"))
        .push(label("금융권 프로젝트:"))
        .extend(dots(
            0,
            &[
                "우리은행, 신한은행, KB국민카드/은행, 하나은행 등",
                "안드로이드 네이티브 앱 개발",
                "웹 서비스 전환 및 고도화",
                "보안 및 인증 시스템 구현",
            ],
        ))
        .push(label("기타 프로젝트:"))
        .extend(dots(
            0,
            &[
                "O2O 플랫폼 개발",
                "증권사 MTS 개발",
                "도시가스 검침 시스템 개발",
                "통합 생산성 앱 개발",
            ],
        ))
        .push(Block::Spacer(GAP))
        .push(Block::heading(2, "주요 강점"))
        .extend(checks(
            0,
            &[
                "금융권 프로젝트 다수 경험",
                "풀스택 개발 역량",
                "크로스 플랫폼 개발 경험",
                "최신 기술 학습 및 적용 능력",
            ],
        ))
        .push(Block::PageBreak)
}

fn contact() -> Section {
    Section::new("Contact")
        .with_layout(SectionLayout::Closing)
        .push(Block::slide("Thank You"))
        .push(Block::Spacer(COVER_GAP))
        .push(Block::text("문의사항이 있으시면 언제든지 연락주세요."))
        .push(Block::Spacer(GAP))
        .push(Block::text(LINKEDIN))
        .push(Block::text(GITHUB))
}
